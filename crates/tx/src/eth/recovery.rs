use alloy_primitives::{keccak256, Address, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1};
use std::sync::OnceLock;

use crate::error::ERR_SIGNATURE_RECOVERY;

/// Recovers the Ethereum address that produced `signature` over
/// `signature_hash`.
pub fn recover_sender_from_signature_hash(
    signature_hash: B256,
    signature: &alloy_primitives::PrimitiveSignature,
) -> helix_core::SdkResult<Address> {
    let mut compact = [0u8; 64];
    let r = signature.r().to_be_bytes::<32>();
    let s = signature.s().to_be_bytes::<32>();
    compact[..32].copy_from_slice(&r);
    compact[32..].copy_from_slice(&s);

    let recid = RecoveryId::from_i32(if signature.v() { 1 } else { 0 })
        .map_err(|_| ERR_SIGNATURE_RECOVERY)?;
    let recoverable =
        RecoverableSignature::from_compact(&compact, recid).map_err(|_| ERR_SIGNATURE_RECOVERY)?;

    let msg = Message::from_digest_slice(signature_hash.as_slice())
        .map_err(|_| ERR_SIGNATURE_RECOVERY)?;
    let pubkey = secp()
        .recover_ecdsa(&msg, &recoverable)
        .map_err(|_| ERR_SIGNATURE_RECOVERY)?;
    Ok(address_from_uncompressed(
        &pubkey.serialize_uncompressed(),
    )?)
}

/// Derives the Ethereum address from a 65-byte uncompressed secp256k1 key.
pub fn address_from_uncompressed(uncompressed: &[u8; 65]) -> helix_core::SdkResult<Address> {
    let pubkey_payload = uncompressed.get(1..).ok_or(ERR_SIGNATURE_RECOVERY)?;
    let hash = keccak256(pubkey_payload);
    let address_bytes = hash.as_slice().get(12..).ok_or(ERR_SIGNATURE_RECOVERY)?;
    Ok(Address::from_slice(address_bytes))
}

fn secp() -> &'static Secp256k1<All> {
    static SECP: OnceLock<Secp256k1<All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}
