//! Context-setup units: gas metering, per-block counting, sandbox gas
//! pricing.

use helix_core::{Context, GasCounter, SdkResult};
use helix_tx::Tx;

use crate::keepers::Keepers;
use crate::native::Decorator;

/// Installs a fresh gas meter bounded by the declared gas limit. Simulation
/// passes start unmetered; the simulation bound is applied by
/// [`LimitSimulationGas`].
pub struct SetUpContext;

impl Decorator for SetUpContext {
    fn name(&self) -> &'static str {
        "setup_context"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        let meter = if simulate {
            GasCounter::infinite()
        } else {
            GasCounter::finite(tx.fee.gas_limit)
        };
        ctx.reset_gas_meter(meter);
        Ok(())
    }
}

/// Bounds gas usage during simulation so an unmetered dry run cannot spin
/// forever. A configured limit of zero leaves simulation unmetered.
pub struct LimitSimulationGas {
    gas_limit: u64,
}

impl LimitSimulationGas {
    pub fn new(gas_limit: u64) -> Self {
        Self { gas_limit }
    }
}

impl Decorator for LimitSimulationGas {
    fn name(&self) -> &'static str {
        "limit_simulation_gas"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        _keepers: &mut Keepers,
        _tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        if simulate && self.gas_limit > 0 {
            ctx.reset_gas_meter(GasCounter::finite(self.gas_limit));
        }
        Ok(())
    }
}

/// Counts the transaction toward the currently open block.
pub struct CountTx;

impl Decorator for CountTx {
    fn name(&self) -> &'static str {
        "count_tx"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        _tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        keepers.tx_counter.increment(ctx.block().height);
        Ok(())
    }
}

/// Applies the configured gas-pricing register for sandboxed-contract
/// execution to the transaction context.
pub struct GasRegister {
    multiplier: u64,
}

impl GasRegister {
    pub fn new(multiplier: u64) -> Self {
        Self { multiplier }
    }
}

impl Decorator for GasRegister {
    fn name(&self) -> &'static str {
        "gas_register"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        _keepers: &mut Keepers,
        _tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        ctx.set_sandbox_gas_multiplier(self.multiplier);
        Ok(())
    }
}
