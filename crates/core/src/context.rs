//! Transaction-scoped execution context.
//!
//! One [`Context`] is owned exclusively by one validation pass (a mempool
//! check, a re-check, or an in-block delivery). It carries the pass mode, the
//! gas meter, the event buffer and the admission priority. Persistent state
//! lives behind keeper interfaces; rolling back keeper writes on a rejected
//! pass is the host's responsibility, never the context's.

use crate::events::Event;
use crate::gas::GasCounter;

/// Which kind of validation pass is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    /// Initial mempool admission check.
    Check,
    /// Mempool re-check after a committed block changed state.
    ReCheck,
    /// In-block delivery.
    Finalize,
}

/// Block-level facts captured once per pass.
#[derive(Clone, Debug)]
pub struct BlockInfo {
    pub height: u64,
    /// Unix timestamp of the block proposal.
    pub time: u64,
    /// Maximum gas the block may carry; `u64::MAX` when unlimited.
    pub max_gas: u64,
    /// Index of the transaction within the block being built or delivered.
    pub tx_index: u64,
}

impl BlockInfo {
    pub fn new(height: u64) -> Self {
        Self {
            height,
            time: 0,
            max_gas: u64::MAX,
            tx_index: 0,
        }
    }
}

/// Mutable per-pass context threaded through the admission pipeline.
#[derive(Debug)]
pub struct Context {
    mode: ExecMode,
    block: BlockInfo,
    gas_meter: GasCounter,
    events: Vec<Event>,
    priority: i64,
    /// Gas-cost multiplier applied to sandboxed contract execution,
    /// configured by the gas-register unit of the native chain.
    sandbox_gas_multiplier: u64,
}

impl Context {
    pub fn new(mode: ExecMode, block: BlockInfo) -> Self {
        Self {
            mode,
            block,
            gas_meter: GasCounter::infinite(),
            events: Vec::new(),
            priority: 0,
            sandbox_gas_multiplier: 1,
        }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn is_check(&self) -> bool {
        matches!(self.mode, ExecMode::Check | ExecMode::ReCheck)
    }

    pub fn is_recheck(&self) -> bool {
        self.mode == ExecMode::ReCheck
    }

    pub fn block(&self) -> &BlockInfo {
        &self.block
    }

    pub fn gas_meter(&mut self) -> &mut GasCounter {
        &mut self.gas_meter
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_meter.gas_used()
    }

    /// Installs a fresh gas meter for the transaction, discarding any prior
    /// metering. Used by the context-setup stage of each pipeline.
    pub fn reset_gas_meter(&mut self, meter: GasCounter) {
        self.gas_meter = meter;
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i64) {
        self.priority = priority;
    }

    pub fn sandbox_gas_multiplier(&self) -> u64 {
        self.sandbox_gas_multiplier
    }

    pub fn set_sandbox_gas_multiplier(&mut self, multiplier: u64) {
        self.sandbox_gas_multiplier = multiplier;
    }
}
