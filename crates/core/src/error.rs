//! Error handling system with compact error codes.
//!
//! ## Error ID Conventions
//!
//! Each error has a 16-bit ID composed of:
//! - Upper 8 bits: Crate namespace (auto-generated from crate name)
//! - Lower 8 bits: Local error ID (0x00-0xFF)
//!
//! ### Recommended Local ID Ranges:
//! - 0x00-0x0F: Structural errors (malformed input, decode failures)
//! - 0x10-0x2F: Policy errors (fees, limits, disallowed content)
//! - 0x30-0x3F: Authentication errors (signatures, nonces)
//! - 0x40-0x4F: Economic errors (balances, transfers)
//! - 0x70-0x7F: Invariant violations (fatal, should be unreachable)

use core::fmt;

/// A compact error value carried through validation pipelines.
///
/// The message template is baked into the constant at definition site, so
/// decoding an error into human-readable text needs no global registry.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ErrorCode {
    pub id: u16,
    pub arg: u16,
    text: &'static str,
}

impl ErrorCode {
    pub const fn from_parts(id: u16, text: &'static str) -> Self {
        Self { id, arg: 0, text }
    }

    /// Attach a `u16` argument, substituted for `{arg}` on display.
    pub const fn with_arg(self, arg: u16) -> Self {
        Self { arg, ..self }
    }

    pub const fn code(self) -> u64 {
        self.id as u64
    }

    pub const fn arg(self) -> u16 {
        self.arg
    }
}

// Identity is the (id, arg) pair; the text is redundant for equal ids.
impl PartialEq for ErrorCode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.arg == other.arg
    }
}

impl Eq for ErrorCode {}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.text.find("{arg}") {
            f.write_str(&self.text[..pos])?;
            write!(f, "{}", self.arg)?;
            f.write_str(&self.text[pos + 5..])
        } else {
            f.write_str(self.text)
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({:#06x}: {})", self.id, self)
    }
}

/// Declares a public `ErrorCode` constant with a crate-namespaced ID.
#[macro_export]
macro_rules! define_error {
    ($ident:ident, $local:expr, $text:expr) => {
        #[allow(dead_code)]
        pub const $ident: $crate::error::ErrorCode = {
            const LOCAL_ID: u16 = $local;
            const _: () = assert!(
                LOCAL_ID <= 0xFF,
                "Local error ID must be <= 0xFF to fit in u8"
            );
            $crate::error::ErrorCode::from_parts(
                (($crate::error::crate_namespace() as u16) << 8) | (LOCAL_ID & 0xFF),
                $text,
            )
        };
    };
}

/// Per-crate namespace byte, derived at compile time from the crate name.
pub const fn crate_namespace() -> u8 {
    const fn fnv1a_hash(bytes: &[u8]) -> u8 {
        const FNV_PRIME: u64 = 0x100000001b3;
        const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;

        let mut hash = FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
            i += 1;
        }
        (hash & 0xFF) as u8
    }

    fnv1a_hash(env!("CARGO_PKG_NAME").as_bytes())
}
