//! Transaction builders for pipeline tests.
//!
//! Keys are generated with `k256`, independent of the `secp256k1` bindings
//! the pipeline verifies with, so the tests exercise real round trips.

use alloy_consensus::{SignableTransaction, TxEip1559, TxLegacy};
use alloy_primitives::{keccak256, Address, Bytes, PrimitiveSignature, TxKind, B256, U256};
use helix_core::Coins;
use helix_tx::{
    EthMsg, ExtensionOption, FeeInfo, Msg, OtherMsg, PubKey, SignMode, SignerInfo, Tx,
};
use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey, VerifyingKey};
use rand::rngs::OsRng;

fn address_of_key(signing_key: &SigningKey) -> Address {
    let verifying_key = VerifyingKey::from(signing_key);
    let public_key = verifying_key.to_encoded_point(false);
    let hash = keccak256(&public_key.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Signs raw Ethereum transactions for the EVM pipeline.
pub struct EthSigner {
    key: SigningKey,
}

impl EthSigner {
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn address(&self) -> Address {
        address_of_key(&self.key)
    }

    fn sign_hash(&self, hash: B256) -> PrimitiveSignature {
        let (sig, recovery_id) = self.key.sign_prehash(hash.as_ref()).expect("sign");
        let r = U256::from_be_slice(&sig.r().to_bytes());
        let s = U256::from_be_slice(&sig.s().to_bytes());
        PrimitiveSignature::new(r, s, recovery_id.is_y_odd())
    }

    /// A signed legacy transfer, RLP encoded.
    pub fn legacy_tx(
        &self,
        chain_id: Option<u64>,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        value: U256,
    ) -> Vec<u8> {
        let tx = TxLegacy {
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(Address::repeat_byte(0x42)),
            value,
            input: Bytes::new(),
        };
        let signature = self.sign_hash(tx.signature_hash());
        let signed = tx.into_signed(signature);
        let mut encoded = Vec::new();
        signed.rlp_encode(&mut encoded);
        encoded
    }

    /// A signed EIP-1559 transfer with its 0x02 type prefix.
    pub fn dynamic_fee_tx(
        &self,
        chain_id: u64,
        nonce: u64,
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
        gas_limit: u64,
        value: U256,
    ) -> Vec<u8> {
        let tx = TxEip1559 {
            chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to: TxKind::Call(Address::repeat_byte(0x42)),
            value,
            access_list: Default::default(),
            input: Bytes::new(),
        };
        let signature = self.sign_hash(tx.signature_hash());
        let signed = tx.into_signed(signature);
        let mut encoded = vec![0x02];
        signed.rlp_encode(&mut encoded);
        encoded
    }
}

/// Wraps raw Ethereum transactions into the native envelope the dispatcher
/// sees, tagged with the Ethereum extension option.
pub fn eth_wrapper_tx(raw_txs: Vec<(Vec<u8>, Address)>, fee: Coins, gas_limit: u64) -> Tx {
    Tx {
        msgs: raw_txs
            .into_iter()
            .map(|(raw, sender)| Msg::Ethereum(EthMsg::new(raw, sender)))
            .collect(),
        fee: FeeInfo {
            amount: fee,
            gas_limit,
            payer: None,
            granter: None,
        },
        memo: String::new(),
        timeout_height: 0,
        extension_options: vec![ExtensionOption::EthereumTx],
        signer_infos: Vec::new(),
        signatures: Vec::new(),
    }
}

/// Signs native transactions with a compressed secp256k1 key.
pub struct NativeSigner {
    key: SigningKey,
}

impl NativeSigner {
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn pub_key(&self) -> PubKey {
        let verifying_key = VerifyingKey::from(&self.key);
        let compressed = verifying_key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(compressed.as_bytes());
        PubKey::Secp256k1(bytes)
    }

    pub fn address(&self) -> Address {
        address_of_key(&self.key)
    }

    /// Compact 64-byte signature over the keccak hash of the sign doc,
    /// normalized to low-s form.
    pub fn sign(&self, sign_doc: &[u8]) -> Vec<u8> {
        let digest = keccak256(sign_doc);
        let (sig, _recovery_id): (k256::ecdsa::Signature, k256::ecdsa::RecoveryId) =
            self.key.sign_prehash(digest.as_ref()).expect("sign");
        let sig = sig.normalize_s().unwrap_or(sig);
        sig.to_bytes().to_vec()
    }

    /// A fully signed single-signer native transaction.
    pub fn build_tx(
        &self,
        chain_id: u64,
        sequence: u64,
        msgs: Vec<Msg>,
        fee: Coins,
        gas_limit: u64,
    ) -> Tx {
        let mut tx = Tx {
            msgs,
            fee: FeeInfo {
                amount: fee,
                gas_limit,
                payer: None,
                granter: None,
            },
            memo: String::new(),
            timeout_height: 0,
            extension_options: Vec::new(),
            signer_infos: vec![SignerInfo {
                address: self.address(),
                pub_key: Some(self.pub_key()),
                sequence,
                sign_mode: SignMode::Direct,
            }],
            signatures: Vec::new(),
        };
        let doc = tx.sign_doc(chain_id, sequence);
        tx.signatures = vec![self.sign(&doc)];
        tx
    }
}

/// An opaque bank-send style message.
pub fn bank_send_msg() -> Msg {
    Msg::Other(OtherMsg {
        type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
        value: vec![1, 2, 3, 4],
    })
}
