//! Keeper interfaces the admission pipeline consumes.
//!
//! The pipeline never owns persistent state. Accounts, balances and
//! fee-market data live behind these narrow traits, injected at construction
//! time; the host wires real module keepers behind them and provides the
//! checkpoint/rollback discipline around each pass.

use alloy_primitives::{Address, B256, U256};
use helix_core::{Coins, SdkResult};
use helix_tx::PubKey;
use serde::{Deserialize, Serialize};

/// Module account the deducted fees are escrowed into.
pub const FEE_COLLECTOR: &str = "fee_collector";

/// A general-store account record.
#[derive(Clone, Debug)]
pub struct Account {
    pub address: Address,
    /// Cached public key, set the first time a signed transaction from this
    /// account is seen.
    pub pub_key: Option<PubKey>,
    pub account_number: u64,
    /// Strictly increasing per-account transaction counter.
    pub sequence: u64,
}

impl Account {
    pub fn new(address: Address, account_number: u64) -> Self {
        Self {
            address,
            pub_key: None,
            account_number,
            sequence: 0,
        }
    }
}

/// An EVM-side account view.
#[derive(Clone, Debug)]
pub struct EvmAccount {
    pub balance: U256,
    /// Keccak hash of the deployed code; `None` for externally owned
    /// accounts.
    pub code_hash: Option<B256>,
    pub nonce: u64,
}

impl EvmAccount {
    pub fn is_contract(&self) -> bool {
        self.code_hash.is_some()
    }
}

/// Authentication-module parameters.
#[derive(Clone, Debug)]
pub struct AuthParams {
    pub max_memo_characters: u64,
    /// Maximum number of signatures a single transaction may carry.
    pub tx_sig_limit: u64,
    pub tx_size_cost_per_byte: u64,
    pub sig_verify_cost_secp256k1: u64,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost_secp256k1: 1000,
        }
    }
}

/// EVM-module parameters the pipeline validates messages against.
#[derive(Clone, Debug)]
pub struct EvmParams {
    /// Denomination fees for EVM transactions are charged in.
    pub evm_denom: String,
    /// Whether legacy transactions without replay protection are admitted.
    pub allow_unprotected_txs: bool,
    /// EIP-2718 type bytes this chain accepts.
    pub enabled_tx_types: Vec<u8>,
    /// EIP-155 chain id.
    pub chain_id: u64,
}

impl Default for EvmParams {
    fn default() -> Self {
        Self {
            evm_denom: "uhlx".to_string(),
            allow_unprotected_txs: false,
            enabled_tx_types: vec![helix_tx::eth::tx_type::LEGACY, helix_tx::eth::tx_type::EIP1559],
            chain_id: 1,
        }
    }
}

/// Which protocol upgrades are active at the current height.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForkRules {
    pub homestead: bool,
    pub istanbul: bool,
    /// Base-fee market active; mempool admission defers to the base fee
    /// instead of the node-local price floor.
    pub london: bool,
}

/// General account storage.
pub trait AccountStore {
    fn account(&self, address: Address) -> Option<Account>;
    fn set_account(&mut self, account: Account);
    /// Creates and stores a fresh account with the next account number.
    fn create_account(&mut self, address: Address) -> Account;
    fn params(&self) -> AuthParams;
}

/// Balance queries and escrow-style transfers into module accounts.
pub trait BalanceLedger {
    fn balance(&self, address: Address, denom: &str) -> u128;
    fn send_to_module(&mut self, from: Address, module: &str, coins: &Coins) -> SdkResult<()>;
}

/// Fee-market oracle: base fee, protocol price floor, fork schedule and the
/// per-block gas-wanted tally.
pub trait FeeMarket {
    /// Current base fee per gas; `None` before the fee market activates.
    fn base_fee(&self) -> Option<u128>;
    /// Protocol-wide minimum gas price every transaction must meet.
    fn min_gas_price(&self) -> u128;
    fn fork_rules(&self) -> ForkRules;
    /// Adds to the transient per-block gas-wanted tally, returning the new
    /// total.
    fn add_transient_gas_wanted(&mut self, gas: u64) -> SdkResult<u64>;
}

/// EVM-side account views and parameters.
pub trait EvmAccountStore {
    fn params(&self) -> EvmParams;
    fn account(&self, address: Address) -> Option<EvmAccount>;
}

/// Receives a share of charged fees (distribution and staking both implement
/// this).
pub trait RewardSink {
    fn allocate(&mut self, source_module: &str, fees: &Coins) -> SdkResult<()>;
}

/// Resolves and verifies native-transaction signatures.
pub trait SigningConfig {
    /// Chain id committed to by native sign docs.
    fn chain_id(&self) -> u64;
    /// Address derived from a public key.
    fn address_of(&self, pub_key: &PubKey) -> Address;
    /// Verifies `signature` over `sign_doc` for `pub_key`.
    fn verify(&self, pub_key: &PubKey, sign_doc: &[u8], signature: &[u8]) -> SdkResult<()>;
}

/// Per-block transaction counter for sandboxed-contract execution.
pub trait TxCounterStore {
    /// Increments and returns the count of transactions seen in the block at
    /// `height`.
    fn increment(&mut self, height: u64) -> u64;
}

/// Read access to processed IBC packet receipts.
pub trait IbcPacketStore {
    fn has_receipt(&self, port: &str, channel: &str, sequence: u64) -> bool;
}

/// Sandboxed-contract execution limits applied by the native chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Gas limit installed for simulation passes; 0 leaves the transaction
    /// limit in place.
    pub simulation_gas_limit: u64,
    /// Multiplier translating sandbox gas into chain gas.
    pub gas_multiplier: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            simulation_gas_limit: 30_000_000,
            gas_multiplier: 140,
        }
    }
}

/// The full set of collaborators one pipeline instance works against.
pub struct Keepers {
    pub accounts: Box<dyn AccountStore>,
    pub bank: Box<dyn BalanceLedger>,
    pub fee_market: Box<dyn FeeMarket>,
    pub evm: Box<dyn EvmAccountStore>,
    pub distribution: Box<dyn RewardSink>,
    pub staking: Box<dyn RewardSink>,
    pub signing: Box<dyn SigningConfig>,
    pub tx_counter: Box<dyn TxCounterStore>,
    pub ibc: Box<dyn IbcPacketStore>,
    /// Node-local mempool price floor, per denomination.
    pub min_gas_prices: Coins,
}
