//! End-to-end admission pipeline scenarios against in-memory keepers.

use alloy_primitives::U256;
use helix_ante::errors::{
    ERR_BLOCK_GAS_EXCEEDED, ERR_FEE_MISMATCH, ERR_INSUFFICIENT_BALANCE,
    ERR_INSUFFICIENT_GLOBAL_FEE, ERR_INSUFFICIENT_MEMPOOL_FEE, ERR_MEMO_TOO_LARGE,
    ERR_MODULE_DISABLED, ERR_NONCE_MISMATCH, ERR_REDUNDANT_RELAY, ERR_TOO_MANY_SIGNATURES,
    ERR_TX_TIMED_OUT, ERR_UNPROTECTED_TX, ERR_UNSUPPORTED_EXTENSION,
};
use helix_ante::keepers::{AuthParams, ForkRules, FEE_COLLECTOR};
use helix_ante::{AnteHandler, ConfigError};
use helix_core::{BlockInfo, Coins, Context, ExecMode};
use helix_testing::{bank_send_msg, eth_wrapper_tx, EthSigner, MockChain, NativeSigner};
use helix_tx::error::ERR_INVALID_CHAIN_ID;
use helix_tx::{ExtensionOption, IbcPacketMsg, Msg};

const DENOM: &str = "uhlx";
const CHAIN_ID: u64 = 1;

fn check_ctx() -> Context {
    Context::new(ExecMode::Check, BlockInfo::new(1))
}

fn handler(chain: &MockChain) -> AnteHandler {
    AnteHandler::new(chain.handler_options()).expect("all keepers provided")
}

// ============================================================================
// Dispatcher
// ============================================================================

#[test]
fn missing_keeper_fails_construction() {
    let err = AnteHandler::new(Default::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKeeper("account store")));
}

#[test]
fn unknown_extension_rejected_before_any_keeper_is_touched() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let mut tx = signer.build_tx(CHAIN_ID, 0, vec![bank_send_msg()], Coins::new(), 200_000);
    tx.extension_options = vec![ExtensionOption::Unknown {
        type_url: "/future.v9.ExtensionOptionQuantumTx".to_string(),
    }];

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_UNSUPPORTED_EXTENSION);

    assert_eq!(chain.write_count(), 0);
    assert_eq!(chain.tx_count(), 0);
    assert_eq!(chain.sequence_of(signer.address()), Some(0));
}

// ============================================================================
// EVM pipeline
// ============================================================================

fn fund(chain: &MockChain, signer: &EthSigner, amount: u128) {
    chain.create_account(signer.address());
    chain.set_evm_account(signer.address(), U256::from(amount));
    chain.set_balance(signer.address(), DENOM, amount);
}

#[test]
fn single_legacy_message_succeeds() {
    let chain = MockChain::new();
    chain.set_min_gas_price(5);
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let mut ctx = check_ctx();
    handler.handle(&mut ctx, &tx, false).unwrap();

    // priority = (price / reduction) for the single message
    assert_eq!(ctx.priority(), 0);
    assert_eq!(ctx.gas_meter().gas_limit(), Some(21_000));
    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), 210_000);
    assert_eq!(chain.balance_of(signer.address(), DENOM), 290_000);
    assert_eq!(chain.sequence_of(signer.address()), Some(1));

    // fee distributed to both reward sinks
    let sinks: Vec<_> = chain.allocations().iter().map(|(l, _)| *l).collect();
    assert_eq!(sinks, vec!["staking", "distribution"]);
}

#[test]
fn insufficient_balance_rejects_without_state_change() {
    let chain = MockChain::new();
    chain.set_min_gas_price(5);
    let signer = EthSigner::random();
    fund(&chain, &signer, 100_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_INSUFFICIENT_BALANCE);

    assert_eq!(chain.sequence_of(signer.address()), Some(0));
    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), 0);
    assert_eq!(chain.write_count(), 0);
}

#[test]
fn nonce_mismatch_rejects_without_balance_mutation() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 0);

    // zero-priced transfer so no fee movement precedes the nonce check
    let raw = signer.legacy_tx(Some(CHAIN_ID), 7, 0, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(vec![(raw, signer.address())], Coins::new(), 21_000);

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_NONCE_MISMATCH);

    assert_eq!(chain.sequence_of(signer.address()), Some(0));
    assert_eq!(chain.write_count(), 0);
}

#[test]
fn multi_message_accumulates_gas_fee_and_min_priority() {
    let chain = MockChain::new();
    chain.set_min_gas_price(1);
    let signer = EthSigner::random();
    fund(&chain, &signer, 200_000_000_000);

    let raw0 = signer.legacy_tx(Some(CHAIN_ID), 0, 2_000_000, 21_000, U256::ZERO);
    let raw1 = signer.legacy_tx(Some(CHAIN_ID), 1, 5_000_000, 21_000, U256::ZERO);
    let total_fee = 2_000_000u128 * 21_000 + 5_000_000u128 * 21_000;
    let tx = eth_wrapper_tx(
        vec![(raw0, signer.address()), (raw1, signer.address())],
        Coins::one(DENOM, total_fee),
        42_000,
    );

    let mut handler = handler(&chain);
    let mut ctx = check_ctx();
    handler.handle(&mut ctx, &tx, false).unwrap();

    // min over the two per-message priorities (2 and 5)
    assert_eq!(ctx.priority(), 2);
    assert_eq!(ctx.gas_meter().gas_limit(), Some(42_000));
    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), total_fee);
    assert_eq!(chain.sequence_of(signer.address()), Some(2));
}

fn london_chain(base_fee: u128) -> MockChain {
    let chain = MockChain::new();
    chain.set_base_fee(Some(base_fee));
    chain.set_fork_rules(ForkRules {
        london: true,
        ..ForkRules::default()
    });
    chain
}

#[test]
fn dynamic_fee_message_commits_fee_cap_but_charges_effective_fee() {
    let chain = london_chain(10);
    let signer = EthSigner::random();
    fund(&chain, &signer, 5_000_000);

    // cap 100, tip 1: charged at min(cap, base + tip) = 11 per gas unit,
    // while the wrapper commits to the full cap
    let raw = signer.dynamic_fee_tx(CHAIN_ID, 0, 100, 1, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 100 * 21_000),
        21_000,
    );

    let mut block = BlockInfo::new(1);
    block.tx_index = 3;
    let mut ctx = Context::new(ExecMode::Check, block);

    let mut handler = handler(&chain);
    handler.handle(&mut ctx, &tx, false).unwrap();

    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), 11 * 21_000);
    assert_eq!(
        chain.balance_of(signer.address(), DENOM),
        5_000_000 - 11 * 21_000
    );
    assert_eq!(chain.sequence_of(signer.address()), Some(1));
    assert_eq!(chain.transient_gas_wanted(), 21_000);
    assert_eq!(ctx.gas_meter().gas_limit(), Some(21_000));

    let event = ctx
        .events()
        .iter()
        .find(|e| e.name == "ethereum_tx")
        .unwrap();
    assert_eq!(event.attribute("index"), Some("0"));
    assert_eq!(event.attribute("block_tx_index"), Some("3"));
}

#[test]
fn dynamic_fee_priority_derives_from_effective_tip() {
    let chain = london_chain(10);
    let signer = EthSigner::random();
    fund(&chain, &signer, 200_000_000_000);

    let raw = signer.dynamic_fee_tx(CHAIN_ID, 0, 5_000_000, 3_000_000, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 5_000_000 * 21_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let mut ctx = check_ctx();
    handler.handle(&mut ctx, &tx, false).unwrap();

    // tip over base: (3_000_010 - 10) / reduction
    assert_eq!(ctx.priority(), 3);
    assert_eq!(
        chain.module_balance(FEE_COLLECTOR, DENOM),
        3_000_010 * 21_000
    );
}

#[test]
fn fee_below_local_mempool_floor_rejected() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut options = chain.handler_options();
    options.min_gas_prices = Coins::one(DENOM, 20);
    let mut handler = AnteHandler::new(options).unwrap();

    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_INSUFFICIENT_MEMPOOL_FEE);
    assert_eq!(chain.write_count(), 0);
}

#[test]
fn fee_below_protocol_minimum_rejected() {
    let chain = MockChain::new();
    chain.set_min_gas_price(50);
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_INSUFFICIENT_GLOBAL_FEE);
    assert_eq!(chain.write_count(), 0);
}

#[test]
fn declared_fee_mismatch_rejected_after_message_loop() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    // wrapper understates the fee the message declares
    let tx = eth_wrapper_tx(vec![(raw, signer.address())], Coins::one(DENOM, 100), 21_000);

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_FEE_MISMATCH);
}

#[test]
fn cumulative_gas_wanted_caps_at_configured_max() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 10_000_000);

    let raw0 = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let raw1 = signer.legacy_tx(Some(CHAIN_ID), 1, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw0, signer.address()), (raw1, signer.address())],
        Coins::one(DENOM, 420_000),
        42_000,
    );

    let mut options = chain.handler_options();
    options.max_tx_gas_wanted = 30_000;
    let mut handler = AnteHandler::new(options).unwrap();

    let mut ctx = check_ctx();
    handler.handle(&mut ctx, &tx, false).unwrap();

    // gas-wanted is capped; the declared gas limit still matches the
    // uncapped per-message sum
    assert_eq!(ctx.gas_meter().gas_limit(), Some(30_000));
}

#[test]
fn unprotected_legacy_tx_rejected_by_default() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(None, 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_UNPROTECTED_TX);
}

#[test]
fn wrong_chain_id_rejected() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID + 1), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_INVALID_CHAIN_ID);
}

#[test]
fn block_gas_limit_rejects_oversized_tx() {
    let chain = MockChain::new();
    let signer = EthSigner::random();
    fund(&chain, &signer, 500_000);

    let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 10, 21_000, U256::ZERO);
    let tx = eth_wrapper_tx(
        vec![(raw, signer.address())],
        Coins::one(DENOM, 210_000),
        21_000,
    );

    let mut block = BlockInfo::new(1);
    block.max_gas = 10_000;
    let mut ctx = Context::new(ExecMode::Check, block);

    let mut handler = handler(&chain);
    let err = handler.handle(&mut ctx, &tx, false).unwrap_err();
    assert_eq!(err, ERR_BLOCK_GAS_EXCEEDED);
}

#[test]
fn recheck_with_unchanged_state_is_idempotent() {
    let build = || {
        let chain = MockChain::new();
        chain.set_min_gas_price(5);
        let signer = EthSigner::random();
        fund(&chain, &signer, 200_000_000_000);
        let raw = signer.legacy_tx(Some(CHAIN_ID), 0, 3_000_000, 21_000, U256::ZERO);
        let tx = eth_wrapper_tx(
            vec![(raw, signer.address())],
            Coins::one(DENOM, 3_000_000 * 21_000),
            21_000,
        );
        (chain, tx)
    };

    let (chain_a, tx_a) = build();
    let mut ctx_a = Context::new(ExecMode::Check, BlockInfo::new(1));
    handler(&chain_a).handle(&mut ctx_a, &tx_a, false).unwrap();

    let (chain_b, tx_b) = build();
    let mut ctx_b = Context::new(ExecMode::ReCheck, BlockInfo::new(1));
    handler(&chain_b).handle(&mut ctx_b, &tx_b, false).unwrap();

    assert_eq!(ctx_a.priority(), ctx_b.priority());
    assert_eq!(
        chain_a.module_balance(FEE_COLLECTOR, DENOM),
        chain_b.module_balance(FEE_COLLECTOR, DENOM)
    );
}

// ============================================================================
// Native chain
// ============================================================================

#[test]
fn native_tx_succeeds_end_to_end() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());
    chain.set_balance(signer.address(), DENOM, 10_000);

    let tx = signer.build_tx(
        CHAIN_ID,
        0,
        vec![bank_send_msg()],
        Coins::one(DENOM, 1_000),
        200_000,
    );

    let mut handler = handler(&chain);
    let mut ctx = check_ctx();
    handler.handle(&mut ctx, &tx, false).unwrap();

    assert_eq!(chain.sequence_of(signer.address()), Some(1));
    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), 1_000);
    assert_eq!(chain.balance_of(signer.address(), DENOM), 9_000);
    assert_eq!(chain.tx_count(), 1);
    assert!(ctx.events().iter().any(|e| e.name == "fee_paid"));
}

#[test]
fn signer_count_rejection_is_reached_after_earlier_units_pass() {
    let chain = MockChain::new();
    chain.set_auth_params(AuthParams {
        tx_sig_limit: 0,
        ..AuthParams::default()
    });
    let signer = NativeSigner::random();
    chain.create_account(signer.address());
    chain.set_balance(signer.address(), DENOM, 10_000);

    let tx = signer.build_tx(
        CHAIN_ID,
        0,
        vec![bank_send_msg()],
        Coins::one(DENOM, 1_000),
        200_000,
    );

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_TOO_MANY_SIGNATURES);

    // earlier units ran: the tx was counted and the fee (an earlier unit)
    // was already deducted when the sig-count unit fired
    assert_eq!(chain.tx_count(), 1);
    assert_eq!(chain.module_balance(FEE_COLLECTOR, DENOM), 1_000);
    // the sequence increment (a later unit) never ran
    assert_eq!(chain.sequence_of(signer.address()), Some(0));
}

#[test]
fn native_nonce_mismatch_skips_sequence_increment() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let tx = signer.build_tx(CHAIN_ID, 5, vec![bank_send_msg()], Coins::new(), 200_000);

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_NONCE_MISMATCH);
    assert_eq!(chain.sequence_of(signer.address()), Some(0));
}

#[test]
fn recheck_skips_signature_verification_but_not_sequence_match() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let mut tx = signer.build_tx(CHAIN_ID, 0, vec![bank_send_msg()], Coins::new(), 200_000);
    tx.signatures = vec![vec![0u8; 64]];

    let mut ctx = Context::new(ExecMode::ReCheck, BlockInfo::new(1));
    let mut handler = handler(&chain);
    handler.handle(&mut ctx, &tx, false).unwrap();
    assert_eq!(chain.sequence_of(signer.address()), Some(1));
}

#[test]
fn oversized_memo_rejected() {
    let chain = MockChain::new();
    chain.set_auth_params(AuthParams {
        max_memo_characters: 4,
        ..AuthParams::default()
    });
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let mut tx = signer.build_tx(CHAIN_ID, 0, vec![bank_send_msg()], Coins::new(), 200_000);
    tx.memo = "hello".to_string();

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_MEMO_TOO_LARGE);
}

#[test]
fn expired_timeout_height_rejected() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let mut tx = signer.build_tx(CHAIN_ID, 0, vec![bank_send_msg()], Coins::new(), 200_000);
    tx.timeout_height = 1;

    let mut ctx = Context::new(ExecMode::Check, BlockInfo::new(5));
    let mut handler = handler(&chain);
    let err = handler.handle(&mut ctx, &tx, false).unwrap_err();
    assert_eq!(err, ERR_TX_TIMED_OUT);
}

#[test]
fn disabled_module_messages_rejected() {
    let chain = MockChain::new();
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let msg = Msg::Other(helix_tx::OtherMsg {
        type_url: "/cosmos.slashing.v1beta1.MsgUnjail".to_string(),
        value: vec![],
    });
    let tx = signer.build_tx(CHAIN_ID, 0, vec![msg], Coins::new(), 200_000);

    let mut options = chain.handler_options();
    options.disabled_modules =
        helix_ante::native::guards::DisabledModules::default_prefixes();
    let mut handler = AnteHandler::new(options).unwrap();

    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_MODULE_DISABLED);
}

#[test]
fn redundant_relay_rejected_on_admission() {
    let chain = MockChain::new();
    chain.add_receipt("transfer", "channel-0", 5);
    let signer = NativeSigner::random();
    chain.create_account(signer.address());

    let msg = Msg::IbcRecvPacket(IbcPacketMsg {
        port: "transfer".to_string(),
        channel: "channel-0".to_string(),
        sequence: 5,
    });
    let tx = signer.build_tx(CHAIN_ID, 0, vec![msg], Coins::new(), 200_000);

    let mut handler = handler(&chain);
    let err = handler.handle(&mut check_ctx(), &tx, false).unwrap_err();
    assert_eq!(err, ERR_REDUNDANT_RELAY);
}

#[test]
fn native_chain_order_is_exposed() {
    let chain = MockChain::new();
    let handler = handler(&chain);
    let names = handler.native_chain_order();
    assert_eq!(names.len(), 20);
    assert_eq!(names.first(), Some(&"reject_eth_msgs"));
    assert_eq!(names.last(), Some(&"gas_wanted"));
}
