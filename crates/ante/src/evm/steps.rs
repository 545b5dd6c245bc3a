//! Per-message validation steps of the EVM pipeline.
//!
//! Each function performs one check or one state transition against the
//! accumulator, in the order the pipeline calls them. Errors are surfaced
//! verbatim; no step retries.

use alloy_primitives::{Address, U256};
use helix_core::{ensure, Context, Event, SdkResult};
use helix_tx::error::ERR_INVALID_CHAIN_ID;
use helix_tx::{EthTxEnvelope, Msg};

use crate::errors::{
    ERR_GAS_WANTED_EXCEEDED, ERR_INSUFFICIENT_BALANCE, ERR_INSUFFICIENT_GLOBAL_FEE,
    ERR_INSUFFICIENT_MEMPOOL_FEE, ERR_INVALID_MSG, ERR_NONCE_MISMATCH, ERR_SENDER_NOT_EOA,
    ERR_SIGNATURE_INVALID, ERR_TRANSFER_REJECTED, ERR_TX_TYPE_NOT_ENABLED, ERR_UNKNOWN_ADDRESS,
    ERR_UNPROTECTED_TX,
};
use crate::evm::accumulator::ValidationAccumulator;
use crate::keepers::{Keepers, FEE_COLLECTOR};

/// Step 1: decode the message into a typed envelope plus the claimed sender.
pub fn decode_msg(msg: &Msg) -> SdkResult<(EthTxEnvelope, Address)> {
    let Msg::Ethereum(eth) = msg else {
        return Err(ERR_INVALID_MSG);
    };
    let envelope = eth.decode()?;
    Ok((envelope, eth.claimed_sender))
}

/// Step 3: mempool-admission fee floor.
///
/// Only enforced on a non-simulated admission check, and only before the
/// base-fee market activates; under london the base fee governs admission
/// instead of the node-local floor.
pub fn check_mempool_fee(
    acc: &ValidationAccumulator,
    ctx: &Context,
    fee: U256,
    gas_limit: u64,
    simulate: bool,
) -> SdkResult<()> {
    if !ctx.is_check() || simulate || acc.rules.london {
        return Ok(());
    }
    let required = U256::from(acc.mempool_min_gas_price) * U256::from(gas_limit);
    ensure!(fee >= required, ERR_INSUFFICIENT_MEMPOOL_FEE);
    Ok(())
}

/// Step 4: replace the declared fee with the effective fee once a base fee
/// is known.
pub fn effective_fee(acc: &ValidationAccumulator, envelope: &EthTxEnvelope, fee: U256) -> U256 {
    match acc.base_fee {
        Some(base) if envelope.is_dynamic_fee() => envelope.effective_fee(base),
        _ => fee,
    }
}

/// Step 5: protocol-wide price floor, and the base fee itself when known.
pub fn check_global_fee(acc: &ValidationAccumulator, envelope: &EthTxEnvelope) -> SdkResult<()> {
    let price = envelope.effective_gas_price(acc.base_fee);
    ensure!(price >= acc.global_min_gas_price, ERR_INSUFFICIENT_GLOBAL_FEE);
    if let Some(base) = acc.base_fee {
        ensure!(price >= base, ERR_INSUFFICIENT_GLOBAL_FEE);
    }
    Ok(())
}

/// Step 6: message contents against current EVM parameters.
pub fn validate_msg(acc: &ValidationAccumulator, envelope: &EthTxEnvelope) -> SdkResult<()> {
    ensure!(envelope.gas_limit() > 0, ERR_INVALID_MSG);

    let ty = envelope.tx_type();
    ensure!(
        acc.evm_params.enabled_tx_types.contains(&ty),
        ERR_TX_TYPE_NOT_ENABLED.with_arg(ty as u16)
    );

    match envelope.chain_id() {
        Some(id) => ensure!(id == acc.evm_params.chain_id, ERR_INVALID_CHAIN_ID),
        None => ensure!(acc.evm_params.allow_unprotected_txs, ERR_UNPROTECTED_TX),
    }
    Ok(())
}

/// Step 7: verify the signature. The recovered sender replaces the claimed
/// one for every later step.
pub fn verify_sig(envelope: &EthTxEnvelope) -> SdkResult<Address> {
    envelope.recover_sender().map_err(|_| ERR_SIGNATURE_INVALID)
}

/// Step 8: the verified sender's EVM account must be externally owned and
/// cover value plus the maximum possible fee. A missing account holds
/// nothing.
pub fn verify_evm_account(
    keepers: &Keepers,
    sender: Address,
    max_cost: U256,
) -> SdkResult<U256> {
    let balance = match keepers.evm.account(sender) {
        Some(account) => {
            ensure!(!account.is_contract(), ERR_SENDER_NOT_EOA);
            account.balance
        }
        None => U256::ZERO,
    };
    ensure!(balance >= max_cost, ERR_INSUFFICIENT_BALANCE);
    Ok(balance)
}

/// Step 9: lightweight transfer dry run against chain rules.
pub fn can_transfer(
    acc: &ValidationAccumulator,
    envelope: &EthTxEnvelope,
    balance: U256,
) -> SdkResult<()> {
    if acc.rules.london && envelope.is_dynamic_fee() {
        // The fee market must be live before dynamic-fee transfers can be
        // priced.
        ensure!(acc.base_fee.is_some(), ERR_TRANSFER_REJECTED);
    }
    ensure!(balance >= envelope.value(), ERR_TRANSFER_REJECTED);
    Ok(())
}

/// Step 10: deduct the authoritative fee and distribute it, emitting a
/// `fee_paid` event.
///
/// A failure here aborts the pass; unwinding the deduction is the host's
/// checkpoint/rollback responsibility.
pub fn consume_fees(
    ctx: &mut Context,
    keepers: &mut Keepers,
    sender: Address,
    fee: U256,
) -> SdkResult<()> {
    if fee.is_zero() {
        return Ok(());
    }
    let coins = helix_core::Coins::one(
        keepers.evm.params().evm_denom,
        u128::try_from(fee).map_err(|_| ERR_INSUFFICIENT_BALANCE)?,
    );
    keepers.bank.send_to_module(sender, FEE_COLLECTOR, &coins)?;
    keepers.staking.allocate(FEE_COLLECTOR, &coins)?;
    keepers.distribution.allocate(FEE_COLLECTOR, &coins)?;

    ctx.emit(
        Event::new("fee_paid")
            .attr("payer", format!("{sender}"))
            .attr("amount", coins.to_string()),
    );
    Ok(())
}

/// Step 12: nonce causality. The verified sender must exist in the general
/// store; its absence is a consistency bug between the two account stores
/// and is fatal for the pass.
pub fn increment_sequence(keepers: &mut Keepers, sender: Address, nonce: u64) -> SdkResult<()> {
    let mut account = keepers
        .accounts
        .account(sender)
        .ok_or(ERR_UNKNOWN_ADDRESS)?;
    ensure!(nonce == account.sequence, ERR_NONCE_MISMATCH);
    account.sequence += 1;
    keepers.accounts.set_account(account);
    Ok(())
}

/// Step 13: gas-wanted policy against the block gas limit, fork-aware.
pub fn check_gas_wanted(
    ctx: &Context,
    keepers: &mut Keepers,
    acc: &ValidationAccumulator,
    gas: u64,
) -> SdkResult<()> {
    if !acc.rules.london {
        return Ok(());
    }
    if ctx.is_check() {
        ensure!(acc.gas_wanted <= ctx.block().max_gas, ERR_GAS_WANTED_EXCEEDED);
    }
    keepers.fee_market.add_transient_gas_wanted(gas)?;
    Ok(())
}

/// Step 14: tag the message's position, its originating transaction and the
/// transaction's place within the block.
pub fn emit_msg_event(
    ctx: &mut Context,
    acc: &ValidationAccumulator,
    envelope: &EthTxEnvelope,
    index: usize,
) {
    ctx.emit(
        Event::new("ethereum_tx")
            .attr("tx_hash", format!("{:#x}", envelope.tx_hash()))
            .attr("index", index.to_string())
            .attr("block_tx_index", acc.block_tx_index.to_string()),
    );
}
