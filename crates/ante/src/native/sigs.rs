//! Signature resolution, verification and sequence accounting.

use helix_core::{ensure, Context, SdkResult};
use helix_tx::Tx;

use crate::errors::{
    ERR_NONCE_MISMATCH, ERR_PUBKEY_MISMATCH, ERR_SIGNATURE_INVALID, ERR_TOO_MANY_SIGNATURES,
    ERR_UNKNOWN_ADDRESS,
};
use crate::keepers::Keepers;
use crate::native::Decorator;

/// Resolves and caches each signer's public key on its account.
///
/// Must run before any signature check: later units read the key from the
/// account record, not from the transaction.
pub struct SetPubKey;

impl Decorator for SetPubKey {
    fn name(&self) -> &'static str {
        "set_pubkey"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        for signer in &tx.signer_infos {
            let Some(pub_key) = &signer.pub_key else {
                continue;
            };
            ensure!(
                keepers.signing.address_of(pub_key) == signer.address,
                ERR_PUBKEY_MISMATCH
            );

            let mut account = keepers
                .accounts
                .account(signer.address)
                .ok_or(ERR_UNKNOWN_ADDRESS)?;
            if account.pub_key.is_none() {
                account.pub_key = Some(pub_key.clone());
                keepers.accounts.set_account(account);
            }
        }
        Ok(())
    }
}

/// Bounds the number of signatures per transaction.
pub struct ValidateSigCount;

impl Decorator for ValidateSigCount {
    fn name(&self) -> &'static str {
        "validate_sig_count"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        let limit = keepers.accounts.params().tx_sig_limit;
        ensure!(
            tx.signatures.len() as u64 <= limit,
            ERR_TOO_MANY_SIGNATURES
        );
        Ok(())
    }
}

/// Charges gas for the upcoming signature verifications.
pub struct SigGasConsume;

impl Decorator for SigGasConsume {
    fn name(&self) -> &'static str {
        "sig_gas_consume"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        let cost = keepers.accounts.params().sig_verify_cost_secp256k1;
        for _ in &tx.signatures {
            ctx.gas_meter().consume_gas(cost)?;
        }
        Ok(())
    }
}

/// Verifies every signature against the resolved sign mode and the signer's
/// cached public key.
///
/// Skipped on re-check: signatures were verified on initial admission and
/// cannot have changed. Sequence numbers can, so the sequence match stays.
pub struct SigVerification;

impl Decorator for SigVerification {
    fn name(&self) -> &'static str {
        "sig_verification"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        for (signer, signature) in tx.signer_infos.iter().zip(&tx.signatures) {
            let account = keepers
                .accounts
                .account(signer.address)
                .ok_or(ERR_UNKNOWN_ADDRESS)?;

            ensure!(signer.sequence == account.sequence, ERR_NONCE_MISMATCH);

            if simulate || ctx.is_recheck() {
                continue;
            }

            let pub_key = account
                .pub_key
                .as_ref()
                .or(signer.pub_key.as_ref())
                .ok_or(ERR_SIGNATURE_INVALID)?;

            let doc = tx.sign_doc(keepers.signing.chain_id(), account.sequence);
            keepers.signing.verify(pub_key, &doc, signature)?;
        }
        Ok(())
    }
}

/// Increments every signer's sequence number exactly once.
pub struct IncrementSequence;

impl Decorator for IncrementSequence {
    fn name(&self) -> &'static str {
        "increment_sequence"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        for signer in &tx.signer_infos {
            let mut account = keepers
                .accounts
                .account(signer.address)
                .ok_or(ERR_UNKNOWN_ADDRESS)?;
            account.sequence += 1;
            keepers.accounts.set_account(account);
        }
        Ok(())
    }
}
