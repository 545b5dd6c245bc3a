//! Pipeline construction and extension-option dispatch.

use helix_core::{Coins, Context, SdkResult};
use helix_tx::{ExtensionOption, Tx};
use thiserror::Error;

use crate::errors::ERR_UNSUPPORTED_EXTENSION;
use crate::evm::EvmPipeline;
use crate::keepers::{
    AccountStore, BalanceLedger, EvmAccountStore, FeeMarket, IbcPacketStore, Keepers, RewardSink,
    SandboxConfig, SigningConfig, TxCounterStore,
};
use crate::native::{default_chain, DecoratorChain};

/// Construction-time failure: a required collaborator was not provided.
/// Fatal at startup, never per-transaction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required keeper: {0}")]
    MissingKeeper(&'static str),
}

/// Everything the handler needs, gathered by the host before construction.
#[derive(Default)]
pub struct HandlerOptions {
    pub accounts: Option<Box<dyn AccountStore>>,
    pub bank: Option<Box<dyn BalanceLedger>>,
    pub fee_market: Option<Box<dyn FeeMarket>>,
    pub evm: Option<Box<dyn EvmAccountStore>>,
    pub distribution: Option<Box<dyn RewardSink>>,
    pub staking: Option<Box<dyn RewardSink>>,
    pub signing: Option<Box<dyn SigningConfig>>,
    pub tx_counter: Option<Box<dyn TxCounterStore>>,
    pub ibc: Option<Box<dyn IbcPacketStore>>,
    pub sandbox: SandboxConfig,
    /// Module prefixes whose messages are rejected outright.
    pub disabled_modules: Vec<String>,
    /// Node-local mempool price floor.
    pub min_gas_prices: Coins,
    /// Cap on cumulative EVM gas-wanted per transaction; 0 disables.
    pub max_tx_gas_wanted: u64,
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingKeeper(name))
}

/// The admission handler a node runs against every incoming transaction.
pub struct AnteHandler {
    keepers: Keepers,
    native: DecoratorChain,
    evm: EvmPipeline,
}

impl core::fmt::Debug for AnteHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnteHandler").finish_non_exhaustive()
    }
}

impl AnteHandler {
    /// Validates the options and wires both pipelines. Missing keepers fail
    /// construction, not first use.
    pub fn new(options: HandlerOptions) -> Result<Self, ConfigError> {
        let keepers = Keepers {
            accounts: require(options.accounts, "account store")?,
            bank: require(options.bank, "balance ledger")?,
            fee_market: require(options.fee_market, "fee market")?,
            evm: require(options.evm, "evm account store")?,
            distribution: require(options.distribution, "distribution sink")?,
            staking: require(options.staking, "staking sink")?,
            signing: require(options.signing, "signing config")?,
            tx_counter: require(options.tx_counter, "tx counter")?,
            ibc: require(options.ibc, "ibc packet store")?,
            min_gas_prices: options.min_gas_prices,
        };

        tracing::info!(
            disabled_modules = ?options.disabled_modules,
            max_tx_gas_wanted = options.max_tx_gas_wanted,
            "constructed admission handler"
        );

        Ok(Self {
            keepers,
            native: default_chain(options.sandbox, options.disabled_modules),
            evm: EvmPipeline::new(options.max_tx_gas_wanted),
        })
    }

    /// Runs one validation pass.
    ///
    /// Selection is total over the first extension option: no option or a
    /// dynamic-fee option takes the native chain, the Ethereum option takes
    /// the EVM pipeline, and an unknown option is rejected before any keeper
    /// is touched. The host decodes wire bytes into a [`Tx`] before calling
    /// in, so a payload that is not a recognized transaction shape fails at
    /// decode and never reaches the handler.
    pub fn handle(&mut self, ctx: &mut Context, tx: &Tx, simulate: bool) -> SdkResult<()> {
        match tx.first_extension_option() {
            Some(ExtensionOption::EthereumTx) => {
                self.evm.run(ctx, &mut self.keepers, tx, simulate)
            }
            Some(ExtensionOption::Unknown { type_url }) => {
                tracing::debug!(%type_url, "rejecting unknown extension option");
                Err(ERR_UNSUPPORTED_EXTENSION)
            }
            Some(ExtensionOption::DynamicFeeTx { .. }) | None => {
                self.native.run(ctx, &mut self.keepers, tx, simulate)
            }
        }
    }

    /// Unit names of the native chain in execution order.
    pub fn native_chain_order(&self) -> Vec<&'static str> {
        self.native.names()
    }
}
