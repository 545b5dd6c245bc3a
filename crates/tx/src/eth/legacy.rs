//! Legacy (pre-EIP-2718) transaction type.

use alloy_consensus::{Signed, TxLegacy};
use alloy_primitives::{keccak256, Address, B256, U256};
use helix_core::SdkResult;

use crate::eth::recovery::recover_sender_from_signature_hash;

/// A signed legacy Ethereum transaction.
///
/// Legacy transactions are pre-EIP-2718 and don't have a type prefix.
/// They support EIP-155 replay protection via chain_id in the signature.
///
/// Sender recovery is deliberately deferred: the admission pipeline checks
/// fees before paying for signature recovery, so the decoded value only
/// caches the hash, not the sender.
#[derive(Clone, Debug)]
pub struct SignedLegacyTx {
    /// The underlying signed transaction from alloy.
    inner: Signed<TxLegacy>,
    /// Cached transaction hash (keccak256 of the RLP-encoded signed tx).
    hash: B256,
}

impl SignedLegacyTx {
    /// Create from an alloy `Signed<TxLegacy>`.
    ///
    /// The hash is computed from the provided raw bytes to ensure consistency
    /// with the original transaction encoding.
    pub fn from_alloy_with_bytes(signed: Signed<TxLegacy>, raw_bytes: &[u8]) -> Self {
        let hash = keccak256(raw_bytes);
        Self {
            inner: signed,
            hash,
        }
    }

    /// Get a reference to the underlying transaction.
    pub fn tx(&self) -> &TxLegacy {
        self.inner.tx()
    }

    /// Get the signature.
    pub fn signature(&self) -> &alloy_primitives::PrimitiveSignature {
        self.inner.signature()
    }

    pub fn tx_hash(&self) -> B256 {
        self.hash
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.tx().chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.tx().nonce
    }

    pub fn gas_limit(&self) -> u64 {
        self.tx().gas_limit
    }

    pub fn gas_price(&self) -> u128 {
        self.tx().gas_price
    }

    pub fn value(&self) -> U256 {
        self.tx().value
    }

    pub fn to(&self) -> Option<Address> {
        self.tx().to.to().copied()
    }

    pub fn input(&self) -> &[u8] {
        &self.tx().input
    }

    /// Declared fee: `gas_price * gas_limit`.
    pub fn fee(&self) -> U256 {
        U256::from(self.gas_price()) * U256::from(self.gas_limit())
    }

    /// Recover the sender address from the signature.
    pub fn recover_sender(&self) -> SdkResult<Address> {
        recover_sender_from_signature_hash(self.inner.signature_hash(), self.inner.signature())
    }

    /// Encode the signed transaction to RLP bytes.
    pub fn rlp_encode(&self, out: &mut Vec<u8>) {
        self.inner.rlp_encode(out);
    }
}
