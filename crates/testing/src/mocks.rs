//! In-memory keeper implementations.
//!
//! All mock keepers share one [`MockChain`] state behind an `Arc<Mutex<..>>`
//! so tests keep a handle for inspection after the boxed keepers move into
//! the handler. Write counters track every persistent mutation, letting
//! tests assert that rejected transactions touched nothing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{keccak256, Address, B256, U256};
use helix_ante::dispatcher::HandlerOptions;
use helix_ante::errors::ERR_INSUFFICIENT_BALANCE;
use helix_ante::keepers::{
    Account, AccountStore, AuthParams, BalanceLedger, EvmAccount, EvmAccountStore, EvmParams,
    FeeMarket, ForkRules, IbcPacketStore, RewardSink, SigningConfig, TxCounterStore,
};
use helix_core::{Coins, SdkResult};
use helix_tx::PubKey;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

#[derive(Default)]
struct ChainState {
    accounts: HashMap<Address, Account>,
    next_account_number: u64,
    auth_params: AuthParams,
    balances: HashMap<(Address, String), u128>,
    module_balances: HashMap<(String, String), u128>,
    evm_accounts: HashMap<Address, EvmAccount>,
    evm_params: EvmParams,
    base_fee: Option<u128>,
    min_gas_price: u128,
    rules: ForkRules,
    transient_gas_wanted: u64,
    allocations: Vec<(&'static str, Coins)>,
    tx_count: u64,
    receipts: HashSet<(String, String, u64)>,
    account_writes: u64,
    balance_writes: u64,
}

/// Shared in-memory chain state plus the keeper handles built over it.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Boxed keepers over this state, ready for `AnteHandler::new`.
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            accounts: Some(Box::new(MockAccounts(self.clone()))),
            bank: Some(Box::new(MockBank(self.clone()))),
            fee_market: Some(Box::new(MockFeeMarket(self.clone()))),
            evm: Some(Box::new(MockEvm(self.clone()))),
            distribution: Some(Box::new(MockSink {
                chain: self.clone(),
                label: "distribution",
            })),
            staking: Some(Box::new(MockSink {
                chain: self.clone(),
                label: "staking",
            })),
            signing: Some(Box::new(DirectSigning::new(1))),
            tx_counter: Some(Box::new(MockTxCounter(self.clone()))),
            ibc: Some(Box::new(MockIbc(self.clone()))),
            ..HandlerOptions::default()
        }
    }

    // Setup helpers.

    pub fn create_account(&self, address: Address) -> Account {
        let mut state = self.lock();
        let number = state.next_account_number;
        state.next_account_number += 1;
        let account = Account::new(address, number);
        state.accounts.insert(address, account.clone());
        account
    }

    pub fn set_balance(&self, address: Address, denom: &str, amount: u128) {
        self.lock()
            .balances
            .insert((address, denom.to_string()), amount);
    }

    pub fn set_evm_account(&self, address: Address, balance: U256) {
        self.lock().evm_accounts.insert(
            address,
            EvmAccount {
                balance,
                code_hash: None,
                nonce: 0,
            },
        );
    }

    pub fn set_contract_account(&self, address: Address, balance: U256, code_hash: B256) {
        self.lock().evm_accounts.insert(
            address,
            EvmAccount {
                balance,
                code_hash: Some(code_hash),
                nonce: 0,
            },
        );
    }

    pub fn set_base_fee(&self, base_fee: Option<u128>) {
        self.lock().base_fee = base_fee;
    }

    pub fn set_min_gas_price(&self, price: u128) {
        self.lock().min_gas_price = price;
    }

    pub fn set_fork_rules(&self, rules: ForkRules) {
        self.lock().rules = rules;
    }

    pub fn set_evm_params(&self, params: EvmParams) {
        self.lock().evm_params = params;
    }

    pub fn set_auth_params(&self, params: AuthParams) {
        self.lock().auth_params = params;
    }

    pub fn add_receipt(&self, port: &str, channel: &str, sequence: u64) {
        self.lock()
            .receipts
            .insert((port.to_string(), channel.to_string(), sequence));
    }

    // Inspection helpers.

    pub fn sequence_of(&self, address: Address) -> Option<u64> {
        self.lock().accounts.get(&address).map(|a| a.sequence)
    }

    pub fn balance_of(&self, address: Address, denom: &str) -> u128 {
        self.lock()
            .balances
            .get(&(address, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn module_balance(&self, module: &str, denom: &str) -> u128 {
        self.lock()
            .module_balances
            .get(&(module.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn allocations(&self) -> Vec<(&'static str, Coins)> {
        self.lock().allocations.clone()
    }

    pub fn tx_count(&self) -> u64 {
        self.lock().tx_count
    }

    pub fn transient_gas_wanted(&self) -> u64 {
        self.lock().transient_gas_wanted
    }

    /// Total persistent writes (accounts + balances) seen so far.
    pub fn write_count(&self) -> u64 {
        let state = self.lock();
        state.account_writes + state.balance_writes
    }
}

struct MockAccounts(MockChain);

impl AccountStore for MockAccounts {
    fn account(&self, address: Address) -> Option<Account> {
        self.0.lock().accounts.get(&address).cloned()
    }

    fn set_account(&mut self, account: Account) {
        let mut state = self.0.lock();
        state.account_writes += 1;
        state.accounts.insert(account.address, account);
    }

    fn create_account(&mut self, address: Address) -> Account {
        let mut state = self.0.lock();
        state.account_writes += 1;
        let number = state.next_account_number;
        state.next_account_number += 1;
        let account = Account::new(address, number);
        state.accounts.insert(address, account.clone());
        account
    }

    fn params(&self) -> AuthParams {
        self.0.lock().auth_params.clone()
    }
}

struct MockBank(MockChain);

impl BalanceLedger for MockBank {
    fn balance(&self, address: Address, denom: &str) -> u128 {
        self.0.balance_of(address, denom)
    }

    fn send_to_module(&mut self, from: Address, module: &str, coins: &Coins) -> SdkResult<()> {
        let mut state = self.0.lock();
        // All-or-nothing: verify every leg before mutating.
        for coin in coins.iter() {
            let held = state
                .balances
                .get(&(from, coin.denom.clone()))
                .copied()
                .unwrap_or(0);
            if held < coin.amount {
                return Err(ERR_INSUFFICIENT_BALANCE);
            }
        }
        for coin in coins.iter() {
            *state.balances.entry((from, coin.denom.clone())).or_insert(0) -= coin.amount;
            *state
                .module_balances
                .entry((module.to_string(), coin.denom.clone()))
                .or_insert(0) += coin.amount;
        }
        state.balance_writes += 1;
        Ok(())
    }
}

struct MockFeeMarket(MockChain);

impl FeeMarket for MockFeeMarket {
    fn base_fee(&self) -> Option<u128> {
        self.0.lock().base_fee
    }

    fn min_gas_price(&self) -> u128 {
        self.0.lock().min_gas_price
    }

    fn fork_rules(&self) -> ForkRules {
        self.0.lock().rules
    }

    fn add_transient_gas_wanted(&mut self, gas: u64) -> SdkResult<u64> {
        let mut state = self.0.lock();
        state.transient_gas_wanted = state.transient_gas_wanted.saturating_add(gas);
        Ok(state.transient_gas_wanted)
    }
}

struct MockEvm(MockChain);

impl EvmAccountStore for MockEvm {
    fn params(&self) -> EvmParams {
        self.0.lock().evm_params.clone()
    }

    fn account(&self, address: Address) -> Option<EvmAccount> {
        self.0.lock().evm_accounts.get(&address).cloned()
    }
}

struct MockSink {
    chain: MockChain,
    label: &'static str,
}

impl RewardSink for MockSink {
    fn allocate(&mut self, _source_module: &str, fees: &Coins) -> SdkResult<()> {
        self.chain
            .lock()
            .allocations
            .push((self.label, fees.clone()));
        Ok(())
    }
}

struct MockTxCounter(MockChain);

impl TxCounterStore for MockTxCounter {
    fn increment(&mut self, _height: u64) -> u64 {
        let mut state = self.0.lock();
        state.tx_count += 1;
        state.tx_count
    }
}

struct MockIbc(MockChain);

impl IbcPacketStore for MockIbc {
    fn has_receipt(&self, port: &str, channel: &str, sequence: u64) -> bool {
        self.0
            .lock()
            .receipts
            .contains(&(port.to_string(), channel.to_string(), sequence))
    }
}

/// Real secp256k1 verification over keccak-hashed sign docs.
pub struct DirectSigning {
    chain_id: u64,
    secp: Secp256k1<secp256k1::All>,
}

impl DirectSigning {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            secp: Secp256k1::new(),
        }
    }
}

impl SigningConfig for DirectSigning {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn address_of(&self, pub_key: &PubKey) -> Address {
        let PubKey::Secp256k1(bytes) = pub_key;
        let Ok(key) = PublicKey::from_slice(bytes) else {
            return Address::ZERO;
        };
        let uncompressed = key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        Address::from_slice(&hash[12..])
    }

    fn verify(&self, pub_key: &PubKey, sign_doc: &[u8], signature: &[u8]) -> SdkResult<()> {
        let PubKey::Secp256k1(bytes) = pub_key;
        let key = PublicKey::from_slice(bytes)
            .map_err(|_| helix_ante::errors::ERR_SIGNATURE_INVALID)?;
        let sig = Signature::from_compact(signature)
            .map_err(|_| helix_ante::errors::ERR_SIGNATURE_INVALID)?;
        let digest = keccak256(sign_doc);
        let message = Message::from_digest(digest.0);
        self.secp
            .verify_ecdsa(&message, &sig, &key)
            .map_err(|_| helix_ante::errors::ERR_SIGNATURE_INVALID)
    }
}
