//! Per-transaction running state for the EVM validation loop.

use alloy_primitives::U256;
use helix_core::Context;

use crate::keepers::{EvmParams, ForkRules, Keepers};

/// Mutable record threaded across the message loop.
///
/// Read-only context is captured once per transaction at derivation;
/// the running totals are updated by exactly one step per message. The
/// value is owned by the pipeline and passed by exclusive reference
/// through the loop body.
#[derive(Clone, Debug)]
pub struct ValidationAccumulator {
    // Read-only context, captured once.
    pub mempool_min_gas_price: u128,
    pub global_min_gas_price: u128,
    /// Current base fee; `None` before the fee market activates.
    pub base_fee: Option<u128>,
    pub evm_params: EvmParams,
    pub rules: ForkRules,
    /// Cumulative gas-wanted cap; `u64::MAX` when unconfigured.
    pub max_gas_wanted: u64,
    /// Index of the transaction within the block.
    pub block_tx_index: u64,

    // Running totals, one writer step per message.
    pub gas_wanted: u64,
    pub tx_fee: U256,
    pub tx_gas_limit: u64,
    pub min_priority: i64,
}

impl ValidationAccumulator {
    /// Captures the read-only fields from the pass context and keepers.
    pub fn derive(ctx: &Context, keepers: &Keepers, max_tx_gas_wanted: u64) -> Self {
        let evm_params = keepers.evm.params();
        let mempool_min_gas_price = keepers.min_gas_prices.amount_of(&evm_params.evm_denom);
        Self {
            mempool_min_gas_price,
            global_min_gas_price: keepers.fee_market.min_gas_price(),
            base_fee: keepers.fee_market.base_fee(),
            evm_params,
            rules: keepers.fee_market.fork_rules(),
            max_gas_wanted: if max_tx_gas_wanted == 0 {
                u64::MAX
            } else {
                max_tx_gas_wanted
            },
            block_tx_index: ctx.block().tx_index,
            gas_wanted: 0,
            tx_fee: U256::ZERO,
            tx_gas_limit: 0,
            min_priority: i64::MAX,
        }
    }

    /// Folds one message's totals in.
    ///
    /// Cumulative gas-wanted is monotone non-decreasing and never exceeds
    /// the configured cap; the gas limit and fee accumulate uncapped; the
    /// minimum priority only ever decreases.
    pub fn accumulate(&mut self, gas: u64, fee: U256, priority: i64) {
        self.gas_wanted = self
            .gas_wanted
            .saturating_add(gas)
            .min(self.max_gas_wanted);
        self.tx_gas_limit = self.tx_gas_limit.saturating_add(gas);
        self.tx_fee = self.tx_fee.saturating_add(fee);
        self.min_priority = self.min_priority.min(priority);
    }
}
