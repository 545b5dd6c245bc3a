//! The native multi-message transaction.

use alloy_primitives::{keccak256, Address};
use helix_core::{ensure, Coins, SdkResult};

use crate::error::{
    ERR_EMPTY_MESSAGES, ERR_NO_SIGNERS, ERR_SIG_COUNT_MISMATCH, ERR_ZERO_GAS_LIMIT,
};
use crate::msg::{ExtensionOption, Msg};

/// The transaction-declared fee.
#[derive(Clone, Debug, Default)]
pub struct FeeInfo {
    /// Total fee offered, across denominations.
    pub amount: Coins,
    /// Declared gas limit for the whole transaction.
    pub gas_limit: u64,
    /// Explicit payer; defaults to the first signer when absent.
    pub payer: Option<Address>,
    /// Account that granted fee payment on the payer's behalf.
    pub granter: Option<Address>,
}

/// How a signature commits to the transaction body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignMode {
    Direct,
    LegacyAminoJson,
}

/// A signer's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PubKey {
    /// 33-byte compressed secp256k1 key.
    Secp256k1([u8; 33]),
}

impl PubKey {
    pub fn bytes(&self) -> &[u8] {
        match self {
            PubKey::Secp256k1(bytes) => bytes,
        }
    }
}

/// Declared signer metadata, one entry per signature.
#[derive(Clone, Debug)]
pub struct SignerInfo {
    pub address: Address,
    /// Public key, absent when the account's stored key should be used.
    pub pub_key: Option<PubKey>,
    /// Sequence number this signature was produced against.
    pub sequence: u64,
    pub sign_mode: SignMode,
}

/// An ordered, non-empty sequence of messages plus authentication data.
///
/// Immutable once dispatched into the admission pipeline.
#[derive(Clone, Debug)]
pub struct Tx {
    pub msgs: Vec<Msg>,
    pub fee: FeeInfo,
    pub memo: String,
    /// Block height after which the transaction is invalid; 0 disables.
    pub timeout_height: u64,
    pub extension_options: Vec<ExtensionOption>,
    pub signer_infos: Vec<SignerInfo>,
    pub signatures: Vec<Vec<u8>>,
}

impl Tx {
    /// The first extension option, which alone determines pipeline selection.
    pub fn first_extension_option(&self) -> Option<&ExtensionOption> {
        self.extension_options.first()
    }

    /// The account charged for the fee: the explicit payer, else the first
    /// signer.
    pub fn fee_payer(&self) -> Option<Address> {
        self.fee
            .payer
            .or_else(|| self.signer_infos.first().map(|s| s.address))
    }

    /// Structural well-formedness checks that need no state access.
    pub fn validate_basic(&self) -> SdkResult<()> {
        ensure!(!self.msgs.is_empty(), ERR_EMPTY_MESSAGES);
        ensure!(self.fee.gas_limit > 0, ERR_ZERO_GAS_LIMIT);
        ensure!(!self.signer_infos.is_empty(), ERR_NO_SIGNERS);
        ensure!(
            self.signatures.len() == self.signer_infos.len(),
            ERR_SIG_COUNT_MISMATCH
        );
        Ok(())
    }

    /// Approximate wire size in bytes, used for size-proportional gas.
    pub fn size_bytes(&self) -> usize {
        let msgs: usize = self.msgs.iter().map(Msg::size_bytes).sum();
        let sigs: usize = self.signatures.iter().map(Vec::len).sum();
        let signers = self.signer_infos.len() * (Address::len_bytes() + 33 + 8);
        // fee coins + memo + fixed body overhead
        let fee: usize = self.fee.amount.iter().map(|c| c.denom.len() + 16).sum();
        msgs + sigs + signers + fee + self.memo.len() + 32
    }

    /// Canonical bytes a signer commits to for the given chain and sequence.
    ///
    /// Deterministic over the message list, fee, memo and timeout height.
    /// Each variable-length field is length-prefixed so no two distinct
    /// transactions share a sign doc.
    pub fn sign_doc(&self, chain_id: u64, sequence: u64) -> Vec<u8> {
        let mut doc = Vec::with_capacity(128);
        doc.extend_from_slice(&chain_id.to_be_bytes());
        doc.extend_from_slice(&sequence.to_be_bytes());
        doc.extend_from_slice(&self.fee.gas_limit.to_be_bytes());
        doc.extend_from_slice(&self.timeout_height.to_be_bytes());

        push_bytes(&mut doc, self.fee.amount.to_string().as_bytes());
        push_bytes(&mut doc, self.memo.as_bytes());

        doc.extend_from_slice(&(self.msgs.len() as u64).to_be_bytes());
        for msg in &self.msgs {
            push_bytes(&mut doc, msg.type_url().as_bytes());
            doc.extend_from_slice(keccak256(msg_payload(msg)).as_slice());
        }
        doc
    }
}

fn push_bytes(doc: &mut Vec<u8>, bytes: &[u8]) {
    doc.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    doc.extend_from_slice(bytes);
}

fn msg_payload(msg: &Msg) -> Vec<u8> {
    match msg {
        Msg::Ethereum(m) => m.raw.clone(),
        Msg::Exec(m) => {
            let mut out = m.grantee.to_vec();
            for inner in &m.msgs {
                out.extend_from_slice(&msg_payload(inner));
            }
            out
        }
        Msg::IbcRecvPacket(m) => {
            let mut out = Vec::new();
            push_bytes(&mut out, m.port.as_bytes());
            push_bytes(&mut out, m.channel.as_bytes());
            out.extend_from_slice(&m.sequence.to_be_bytes());
            out
        }
        Msg::Other(m) => {
            let mut out = Vec::new();
            push_bytes(&mut out, m.type_url.as_bytes());
            out.extend_from_slice(&m.value);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::OtherMsg;
    use helix_core::Coins;

    fn sample_msg() -> Msg {
        Msg::Other(OtherMsg {
            type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
            value: vec![1, 2, 3],
        })
    }

    fn sample_tx() -> Tx {
        Tx {
            msgs: vec![sample_msg()],
            fee: FeeInfo {
                amount: Coins::one("uhlx", 1000),
                gas_limit: 200_000,
                payer: None,
                granter: None,
            },
            memo: String::new(),
            timeout_height: 0,
            extension_options: vec![],
            signer_infos: vec![SignerInfo {
                address: Address::repeat_byte(0x11),
                pub_key: None,
                sequence: 0,
                sign_mode: SignMode::Direct,
            }],
            signatures: vec![vec![0u8; 64]],
        }
    }

    #[test]
    fn validate_basic_accepts_wellformed_tx() {
        assert!(sample_tx().validate_basic().is_ok());
    }

    #[test]
    fn validate_basic_rejects_empty_msgs() {
        let mut tx = sample_tx();
        tx.msgs.clear();
        assert_eq!(tx.validate_basic().unwrap_err(), ERR_EMPTY_MESSAGES);
    }

    #[test]
    fn validate_basic_rejects_signature_count_mismatch() {
        let mut tx = sample_tx();
        tx.signatures.push(vec![0u8; 64]);
        assert_eq!(tx.validate_basic().unwrap_err(), ERR_SIG_COUNT_MISMATCH);
    }

    #[test]
    fn fee_payer_defaults_to_first_signer() {
        let tx = sample_tx();
        assert_eq!(tx.fee_payer(), Some(Address::repeat_byte(0x11)));

        let mut tx = sample_tx();
        tx.fee.payer = Some(Address::repeat_byte(0x22));
        assert_eq!(tx.fee_payer(), Some(Address::repeat_byte(0x22)));
    }

    #[test]
    fn sign_doc_is_sensitive_to_sequence_and_chain() {
        let tx = sample_tx();
        let a = tx.sign_doc(1, 0);
        let b = tx.sign_doc(1, 1);
        let c = tx.sign_doc(2, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sign_doc_is_sensitive_to_memo() {
        let mut tx = sample_tx();
        let a = tx.sign_doc(1, 0);
        tx.memo = "hello".to_string();
        let b = tx.sign_doc(1, 0);
        assert_ne!(a, b);
    }
}
