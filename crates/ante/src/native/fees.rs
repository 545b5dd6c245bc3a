//! Fee deduction and gas-wanted accounting for the native chain.

use helix_core::{ensure, Context, Event, SdkResult};
use helix_tx::{ExtensionOption, Tx, PRIORITY_REDUCTION};

use crate::errors::{
    ERR_GAS_WANTED_EXCEEDED, ERR_INSUFFICIENT_MEMPOOL_FEE, ERR_UNKNOWN_ADDRESS,
};
use crate::keepers::{Keepers, FEE_COLLECTOR};
use crate::native::Decorator;

/// Deducts the declared fee from the payer (or fee granter) into the fee
/// collector, enforcing the node-local price floor on admission checks and
/// deriving the transaction's priority.
pub struct DeductFee;

impl DeductFee {
    /// Node-local floor: the fee must cover `price * gas` in at least one of
    /// the node's configured denominations.
    fn check_mempool_fee(&self, keepers: &Keepers, tx: &Tx) -> SdkResult<()> {
        if keepers.min_gas_prices.is_empty() {
            return Ok(());
        }
        let gas = u128::from(tx.fee.gas_limit);
        let covered = keepers.min_gas_prices.iter().any(|floor| {
            let required = floor.amount.saturating_mul(gas);
            tx.fee.amount.amount_of(&floor.denom) >= required
        });
        ensure!(covered, ERR_INSUFFICIENT_MEMPOOL_FEE);
        Ok(())
    }

    /// Priority from the fee's gas price in the fee denomination, reduced by
    /// the tip under a dynamic-fee extension when a base fee is known.
    fn priority(&self, keepers: &Keepers, tx: &Tx) -> i64 {
        let denom = keepers.evm.params().evm_denom;
        let gas = u128::from(tx.fee.gas_limit.max(1));
        let price = tx.fee.amount.amount_of(&denom) / gas;

        let tip = match (tx.first_extension_option(), keepers.fee_market.base_fee()) {
            (Some(ExtensionOption::DynamicFeeTx { max_priority_price }), Some(base)) => {
                price.saturating_sub(base).min(*max_priority_price)
            }
            _ => price,
        };
        i64::try_from(tip / PRIORITY_REDUCTION).unwrap_or(i64::MAX)
    }
}

impl Decorator for DeductFee {
    fn name(&self) -> &'static str {
        "deduct_fee"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        if ctx.is_check() && !simulate {
            self.check_mempool_fee(keepers, tx)?;
        }

        let payer = tx
            .fee
            .granter
            .or_else(|| tx.fee_payer())
            .ok_or(ERR_UNKNOWN_ADDRESS)?;

        if !tx.fee.amount.is_empty() {
            ensure!(keepers.accounts.account(payer).is_some(), ERR_UNKNOWN_ADDRESS);
            keepers
                .bank
                .send_to_module(payer, FEE_COLLECTOR, &tx.fee.amount)?;

            ctx.emit(
                Event::new("fee_paid")
                    .attr("payer", format!("{payer}"))
                    .attr("amount", tx.fee.amount.to_string()),
            );
        }

        ctx.set_priority(self.priority(keepers, tx));
        Ok(())
    }
}

/// Records the transaction's gas-wanted ceiling against the per-block tally
/// once the fee market is active.
pub struct GasWanted;

impl Decorator for GasWanted {
    fn name(&self) -> &'static str {
        "gas_wanted"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        if !keepers.fee_market.fork_rules().london {
            return Ok(());
        }

        let gas_wanted = tx.fee.gas_limit;
        if ctx.is_check() {
            ensure!(gas_wanted <= ctx.block().max_gas, ERR_GAS_WANTED_EXCEEDED);
        }
        keepers.fee_market.add_transient_gas_wanted(gas_wanted)?;
        Ok(())
    }
}
