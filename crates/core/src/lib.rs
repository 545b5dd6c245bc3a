//! Core types shared across the helix chain app.
//!
//! This crate holds the pieces every other layer builds on: compact error
//! codes, coin/denomination arithmetic, events, gas metering, and the
//! transaction-scoped [`Context`] that validation passes own exclusively.

pub mod coin;
pub mod context;
pub mod error;
pub mod events;
pub mod gas;

pub use coin::{Coin, Coins};
pub use context::{BlockInfo, Context, ExecMode};
pub use error::ErrorCode;
pub use events::{Event, EventAttribute};
pub use gas::GasCounter;

pub type SdkResult<T> = Result<T, ErrorCode>;

/// A macro that ensures a condition holds true. If not, returns an error.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
