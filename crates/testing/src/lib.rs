//! Test support for the helix admission pipeline: in-memory mock keepers
//! sharing one inspectable state, plus signed-transaction builders.

pub mod builders;
pub mod mocks;

pub use builders::{bank_send_msg, eth_wrapper_tx, EthSigner, NativeSigner};
pub use mocks::{DirectSigning, MockChain};
