//! Ethereum typed-transaction support.
//!
//! Implements EIP-2718 envelopes for the transaction types the chain admits:
//!
//! - **Legacy (0x00)**: Pre-EIP-2718 transactions, optionally with EIP-155
//!   replay protection
//! - **EIP-1559 (0x02)**: Fee market transactions with base fee and priority
//!   fee

pub mod dynamic_fee;
pub mod envelope;
pub mod legacy;
pub mod recovery;

pub use dynamic_fee::SignedDynamicFeeTx;
pub use envelope::{tx_type, EthTxEnvelope, PRIORITY_REDUCTION};
pub use legacy::SignedLegacyTx;
pub use recovery::{address_from_uncompressed, recover_sender_from_signature_hash};
