//! Native-transaction decorator chain.
//!
//! Twenty independent check units run in a fixed order; any failure aborts
//! the chain with that unit's error. Ordering is data, held in the chain's
//! vector, so it can be asserted in tests independently of the units.

use helix_core::{Context, SdkResult};
use helix_tx::Tx;

use crate::keepers::{Keepers, SandboxConfig};

pub mod basic;
pub mod fees;
pub mod guards;
pub mod ibc;
pub mod setup;
pub mod sigs;

/// One validation/accounting unit in the native chain.
///
/// Units may read and mutate the transaction-scoped context freely; fee
/// deduction and sequence increment are the only units with persistent
/// effects, and both sit after every non-idempotent check.
pub trait Decorator {
    fn name(&self) -> &'static str;

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()>;
}

/// An ordered sequence of decorators folded left-to-right.
pub struct DecoratorChain {
    decorators: Vec<Box<dyn Decorator>>,
}

impl DecoratorChain {
    pub fn new(decorators: Vec<Box<dyn Decorator>>) -> Self {
        Self { decorators }
    }

    /// Runs every unit in order, short-circuiting on the first error.
    pub fn run(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        simulate: bool,
    ) -> SdkResult<()> {
        for decorator in &self.decorators {
            decorator.ante(ctx, keepers, tx, simulate).map_err(|err| {
                tracing::debug!(unit = decorator.name(), %err, "native chain rejected tx");
                err
            })?;
        }
        Ok(())
    }

    /// Unit names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }
}

/// Builds the native chain in its required order.
pub fn default_chain(
    sandbox: SandboxConfig,
    disabled_modules: Vec<String>,
) -> DecoratorChain {
    DecoratorChain::new(vec![
        Box::new(guards::RejectEthMsgs),
        Box::new(guards::AuthzLimiter::default()),
        Box::new(setup::SetUpContext),
        Box::new(setup::LimitSimulationGas::new(sandbox.simulation_gas_limit)),
        Box::new(setup::CountTx),
        Box::new(setup::GasRegister::new(sandbox.gas_multiplier)),
        Box::new(guards::ExtensionOptionsCheck),
        Box::new(guards::DisabledModules::new(disabled_modules)),
        Box::new(basic::ValidateBasic),
        Box::new(basic::TimeoutHeight),
        Box::new(basic::ValidateMemo),
        Box::new(basic::ConsumeTxSizeGas),
        Box::new(fees::DeductFee),
        Box::new(sigs::SetPubKey),
        Box::new(sigs::ValidateSigCount),
        Box::new(sigs::SigGasConsume),
        Box::new(sigs::SigVerification),
        Box::new(sigs::IncrementSequence),
        Box::new(ibc::RedundantRelay),
        Box::new(fees::GasWanted),
    ])
}
