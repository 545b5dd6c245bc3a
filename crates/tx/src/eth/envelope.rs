//! Transaction envelope supporting EIP-2718 typed transactions.

use alloy_primitives::{Address, B256, U256};
use helix_core::SdkResult;

use crate::error::{
    ERR_EMPTY_INPUT, ERR_TRAILING_BYTES, ERR_TX_DECODE, ERR_UNSUPPORTED_TX_TYPE,
};
use crate::eth::dynamic_fee::SignedDynamicFeeTx;
use crate::eth::legacy::SignedLegacyTx;

/// Divisor applied to the effective tip when deriving admission priority.
pub const PRIORITY_REDUCTION: u128 = 1_000_000;

/// Transaction type constants per EIP-2718.
pub mod tx_type {
    /// Legacy transaction (pre-EIP-2718).
    pub const LEGACY: u8 = 0x00;
    /// EIP-2930 access list transaction.
    pub const EIP2930: u8 = 0x01;
    /// EIP-1559 fee market transaction.
    pub const EIP1559: u8 = 0x02;
    /// EIP-4844 blob transaction.
    pub const EIP4844: u8 = 0x03;
}

/// Unified envelope over the Ethereum transaction types the chain admits.
#[derive(Clone, Debug)]
pub enum EthTxEnvelope {
    /// Legacy transaction (type 0x00 or untyped).
    Legacy(SignedLegacyTx),
    /// EIP-1559 fee market transaction (type 0x02).
    DynamicFee(SignedDynamicFeeTx),
}

impl EthTxEnvelope {
    /// Decode a transaction from RLP-encoded bytes.
    ///
    /// Handles both legacy (untyped) and typed (EIP-2718) transactions:
    /// - Legacy: RLP list starting with 0xc0-0xff
    /// - Typed: Type byte (0x00-0x7f) followed by RLP payload
    pub fn decode(bytes: &[u8]) -> SdkResult<Self> {
        let mut input = bytes;
        let tx = Self::decode_from(&mut input)?;
        if !input.is_empty() {
            return Err(ERR_TRAILING_BYTES);
        }
        Ok(tx)
    }

    /// Decode a transaction from the front of a byte slice, advancing it.
    pub fn decode_from(bytes: &mut &[u8]) -> SdkResult<Self> {
        if bytes.is_empty() {
            return Err(ERR_EMPTY_INPUT);
        }

        let input = *bytes;
        let first_byte = input[0];

        // RLP list prefixes start at 0xc0, marking an untyped legacy tx.
        if first_byte >= 0xc0 {
            let mut cursor = input;
            let signed =
                alloy_consensus::Signed::<alloy_consensus::TxLegacy>::rlp_decode(&mut cursor)
                    .map_err(|_| ERR_TX_DECODE)?;

            let consumed = input.len().saturating_sub(cursor.len());
            let raw_bytes = &input[..consumed];
            let tx = SignedLegacyTx::from_alloy_with_bytes(signed, raw_bytes);
            *bytes = &input[consumed..];
            return Ok(EthTxEnvelope::Legacy(tx));
        }

        // Typed transaction: first byte is the type.
        match first_byte {
            tx_type::LEGACY => Err(ERR_UNSUPPORTED_TX_TYPE.with_arg(tx_type::LEGACY as u16)),
            tx_type::EIP1559 => {
                let payload = &input[1..];
                let mut cursor = payload;
                let signed =
                    alloy_consensus::Signed::<alloy_consensus::TxEip1559>::rlp_decode(&mut cursor)
                        .map_err(|_| ERR_TX_DECODE)?;

                let consumed = payload.len().saturating_sub(cursor.len());
                let raw_with_prefix = &input[..1 + consumed];
                let tx = SignedDynamicFeeTx::from_alloy_with_bytes(signed, raw_with_prefix);
                *bytes = &input[1 + consumed..];
                Ok(EthTxEnvelope::DynamicFee(tx))
            }
            ty => Err(ERR_UNSUPPORTED_TX_TYPE.with_arg(ty as u16)),
        }
    }

    /// Encode the transaction to its wire format.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            EthTxEnvelope::Legacy(tx) => {
                let mut buf = Vec::new();
                tx.rlp_encode(&mut buf);
                buf
            }
            EthTxEnvelope::DynamicFee(tx) => {
                let mut buf = vec![tx_type::EIP1559];
                tx.rlp_encode(&mut buf);
                buf
            }
        }
    }

    /// Returns the transaction type byte.
    pub fn tx_type(&self) -> u8 {
        match self {
            EthTxEnvelope::Legacy(_) => tx_type::LEGACY,
            EthTxEnvelope::DynamicFee(_) => tx_type::EIP1559,
        }
    }

    pub fn is_dynamic_fee(&self) -> bool {
        matches!(self, EthTxEnvelope::DynamicFee(_))
    }

    pub fn tx_hash(&self) -> B256 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.tx_hash(),
            EthTxEnvelope::DynamicFee(tx) => tx.tx_hash(),
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.chain_id(),
            EthTxEnvelope::DynamicFee(tx) => Some(tx.chain_id()),
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.nonce(),
            EthTxEnvelope::DynamicFee(tx) => tx.nonce(),
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.gas_limit(),
            EthTxEnvelope::DynamicFee(tx) => tx.gas_limit(),
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.value(),
            EthTxEnvelope::DynamicFee(tx) => tx.value(),
        }
    }

    pub fn to(&self) -> Option<Address> {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.to(),
            EthTxEnvelope::DynamicFee(tx) => tx.to(),
        }
    }

    pub fn input(&self) -> &[u8] {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.input(),
            EthTxEnvelope::DynamicFee(tx) => tx.input(),
        }
    }

    /// Declared fee: `declared gas price * gas_limit`.
    ///
    /// For dynamic-fee transactions the declared price is the fee cap; use
    /// [`effective_fee`](Self::effective_fee) once a base fee is known.
    pub fn fee(&self) -> U256 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.fee(),
            EthTxEnvelope::DynamicFee(tx) => tx.fee(),
        }
    }

    /// Fee charged under the given base fee.
    pub fn effective_fee(&self, base_fee: u128) -> U256 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.fee(),
            EthTxEnvelope::DynamicFee(tx) => tx.effective_fee(base_fee),
        }
    }

    /// Gas price actually paid per unit under the given base fee.
    pub fn effective_gas_price(&self, base_fee: Option<u128>) -> u128 {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.gas_price(),
            EthTxEnvelope::DynamicFee(tx) => tx.effective_gas_price(base_fee.unwrap_or(0)),
        }
    }

    /// Upper bound on what this transaction can cost the sender:
    /// `value + declared fee`.
    pub fn max_cost(&self) -> U256 {
        self.value().saturating_add(self.fee())
    }

    /// Admission priority derived from the effective tip over the base fee.
    ///
    /// When a base fee is known the tip is `effective_gas_price - base_fee`;
    /// otherwise the full effective price counts. The result saturates into
    /// `i64`.
    pub fn priority(&self, base_fee: Option<u128>) -> i64 {
        let price = self.effective_gas_price(base_fee);
        let tip = match base_fee {
            Some(base) => price.saturating_sub(base),
            None => price,
        };
        let reduced = tip / PRIORITY_REDUCTION;
        i64::try_from(reduced).unwrap_or(i64::MAX)
    }

    /// Recover the sender address from the signature.
    pub fn recover_sender(&self) -> SdkResult<Address> {
        match self {
            EthTxEnvelope::Legacy(tx) => tx.recover_sender(),
            EthTxEnvelope::DynamicFee(tx) => tx.recover_sender(),
        }
    }
}
