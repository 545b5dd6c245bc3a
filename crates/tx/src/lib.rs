//! Transaction data model: native multi-message transactions and Ethereum
//! typed-transaction envelopes.
//!
//! A node sees two transaction shapes on the wire. Native transactions carry
//! an ordered message list, a declared fee, and per-signer authentication
//! data. EVM transactions arrive as native wrappers whose messages each embed
//! a raw EIP-2718 Ethereum transaction, flagged by an extension option.

pub mod error;
pub mod eth;
pub mod msg;
pub mod tx;

pub use eth::{EthTxEnvelope, SignedDynamicFeeTx, SignedLegacyTx, PRIORITY_REDUCTION};
pub use msg::{extension_url, type_url, EthMsg, ExtensionOption, IbcPacketMsg, Msg, MsgExec, OtherMsg};
pub use tx::{FeeInfo, PubKey, SignMode, SignerInfo, Tx};
