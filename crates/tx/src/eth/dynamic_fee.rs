//! EIP-1559 dynamic-fee transaction type.

use alloy_consensus::{Signed, TxEip1559};
use alloy_primitives::{keccak256, Address, B256, U256};
use helix_core::SdkResult;

use crate::eth::recovery::recover_sender_from_signature_hash;

/// A signed EIP-1559 fee-market transaction.
///
/// Dynamic-fee transactions declare a fee cap (`max_fee_per_gas`) and a tip
/// (`max_priority_fee_per_gas`); the fee actually charged depends on the
/// network base fee at inclusion time.
#[derive(Clone, Debug)]
pub struct SignedDynamicFeeTx {
    inner: Signed<TxEip1559>,
    /// Cached transaction hash (keccak256 of the type byte + RLP payload).
    hash: B256,
}

impl SignedDynamicFeeTx {
    /// Create from an alloy `Signed<TxEip1559>`.
    ///
    /// `raw_bytes` must be the full wire encoding including the 0x02 type
    /// prefix so the cached hash matches the original encoding.
    pub fn from_alloy_with_bytes(signed: Signed<TxEip1559>, raw_bytes: &[u8]) -> Self {
        let hash = keccak256(raw_bytes);
        Self {
            inner: signed,
            hash,
        }
    }

    pub fn tx(&self) -> &TxEip1559 {
        self.inner.tx()
    }

    pub fn signature(&self) -> &alloy_primitives::PrimitiveSignature {
        self.inner.signature()
    }

    pub fn tx_hash(&self) -> B256 {
        self.hash
    }

    pub fn chain_id(&self) -> u64 {
        self.tx().chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.tx().nonce
    }

    pub fn gas_limit(&self) -> u64 {
        self.tx().gas_limit
    }

    pub fn max_fee_per_gas(&self) -> u128 {
        self.tx().max_fee_per_gas
    }

    pub fn max_priority_fee_per_gas(&self) -> u128 {
        self.tx().max_priority_fee_per_gas
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

    /// Declared (maximum) fee: `max_fee_per_gas * gas_limit`.
    pub fn fee(&self) -> U256 {
        U256::from(self.max_fee_per_gas()) * U256::from(self.gas_limit())
    }

    /// Effective gas price under the given base fee:
    /// `min(max_fee, base_fee + max_priority_fee)`.
    pub fn effective_gas_price(&self, base_fee: u128) -> u128 {
        self.max_fee_per_gas()
            .min(base_fee.saturating_add(self.max_priority_fee_per_gas()))
    }

    /// Fee charged under the given base fee:
    /// `effective_gas_price * gas_limit`.
    pub fn effective_fee(&self, base_fee: u128) -> U256 {
        U256::from(self.effective_gas_price(base_fee)) * U256::from(self.gas_limit())
    }

    /// Recover the sender address from the signature.
    pub fn recover_sender(&self) -> SdkResult<Address> {
        recover_sender_from_signature_hash(self.inner.signature_hash(), self.inner.signature())
    }

    /// Encode the signed transaction payload to RLP bytes (without the
    /// EIP-2718 type prefix).
    pub fn rlp_encode(&self, out: &mut Vec<u8>) {
        self.inner.rlp_encode(out);
    }
}
