//! EVM validation pipeline.
//!
//! One pass per transaction: structural validation, accumulator derivation,
//! then the fourteen per-message steps in strict order, then whole-transaction
//! consistency checks. First failure is terminal for the pass; unwinding any
//! partial writes is the host's checkpoint/rollback responsibility.

use alloy_primitives::U256;
use helix_core::{ensure, Context, GasCounter, SdkResult};
use helix_tx::error::ERR_EMPTY_MESSAGES;
use helix_tx::{ExtensionOption, FeeInfo, Msg, Tx};

use crate::errors::{ERR_BLOCK_GAS_EXCEEDED, ERR_EXTENSION_COUNT, ERR_FEE_MISMATCH, ERR_INVALID_MSG};
use crate::keepers::Keepers;

pub mod accumulator;
pub mod steps;

pub use accumulator::ValidationAccumulator;

/// Drives per-message validation across one EVM transaction.
pub struct EvmPipeline {
    /// Cap on the cumulative gas-wanted a single transaction may claim;
    /// 0 disables the cap.
    max_tx_gas_wanted: u64,
}

impl EvmPipeline {
    pub fn new(max_tx_gas_wanted: u64) -> Self {
        Self { max_tx_gas_wanted }
    }

    /// Structural validation, skipped on re-check. Returns the declared
    /// `FeeInfo` for the post-loop consistency check.
    fn validate_structure(&self, tx: &Tx) -> SdkResult<FeeInfo> {
        ensure!(!tx.msgs.is_empty(), ERR_EMPTY_MESSAGES);
        ensure!(tx.extension_options.len() == 1, ERR_EXTENSION_COUNT);
        ensure!(
            matches!(tx.extension_options[0], ExtensionOption::EthereumTx),
            ERR_EXTENSION_COUNT
        );
        for msg in &tx.msgs {
            ensure!(matches!(msg, Msg::Ethereum(_)), ERR_INVALID_MSG);
        }
        Ok(tx.fee.clone())
    }

    pub fn run(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        let fee_info = if ctx.is_recheck() {
            None
        } else {
            Some(self.validate_structure(tx)?)
        };

        // Fresh context: ante-stage work is unmetered, the real meter is
        // installed from the accumulated gas-wanted at the end.
        ctx.reset_gas_meter(GasCounter::infinite());
        let mut acc = ValidationAccumulator::derive(ctx, keepers, self.max_tx_gas_wanted);

        for (index, msg) in tx.msgs.iter().enumerate() {
            self.run_msg(ctx, keepers, &mut acc, msg, index, simulate)?;
        }

        if let Some(fee_info) = fee_info {
            self.check_fee_info(&acc, &fee_info)?;
        }
        ensure!(acc.gas_wanted <= ctx.block().max_gas, ERR_BLOCK_GAS_EXCEEDED);

        ctx.set_priority(acc.min_priority);
        ctx.reset_gas_meter(GasCounter::finite(acc.gas_wanted));
        Ok(())
    }

    fn run_msg(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        acc: &mut ValidationAccumulator,
        msg: &Msg,
        index: usize,
        simulate: bool,
    ) -> SdkResult<()> {
        let (envelope, _claimed) = steps::decode_msg(msg)?;

        let gas_limit = envelope.gas_limit();
        let declared_fee = envelope.fee();

        steps::check_mempool_fee(acc, ctx, declared_fee, gas_limit, simulate)?;
        let charged_fee = steps::effective_fee(acc, &envelope, declared_fee);
        steps::check_global_fee(acc, &envelope)?;
        steps::validate_msg(acc, &envelope)?;

        let sender = steps::verify_sig(&envelope)?;

        let max_cost = envelope.max_cost();
        let balance = steps::verify_evm_account(keepers, sender, max_cost)?;
        steps::can_transfer(acc, &envelope, balance)?;
        steps::consume_fees(ctx, keepers, sender, charged_fee)?;

        // The declared fee (cap * gas) is what the wrapper's FeeInfo commits
        // to; the effective fee is merely what gets charged.
        acc.accumulate(gas_limit, declared_fee, envelope.priority(acc.base_fee));

        steps::increment_sequence(keepers, sender, envelope.nonce())?;
        steps::check_gas_wanted(ctx, keepers, acc, gas_limit)?;
        steps::emit_msg_event(ctx, acc, &envelope, index);
        Ok(())
    }

    /// Post-loop: the declared totals must match what the loop accumulated.
    fn check_fee_info(&self, acc: &ValidationAccumulator, fee_info: &FeeInfo) -> SdkResult<()> {
        let declared = U256::from(fee_info.amount.amount_of(&acc.evm_params.evm_denom));
        ensure!(declared == acc.tx_fee, ERR_FEE_MISMATCH);
        ensure!(fee_info.gas_limit == acc.tx_gas_limit, ERR_FEE_MISMATCH);
        Ok(())
    }
}
