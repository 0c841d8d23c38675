//! Deposit (outgoing transfer) integration tests.
//!
//! Covers native, CW20 lock and CW20 burn deposits:
//! - Fee split between fee recipient and net deposit
//! - Nonce assignment and transfer hash recording
//! - Rejection of unregistered chains, missing mappings, bad funds and pause

use cosmwasm_std::{coins, Addr, Binary, Coin, Empty, Uint128};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg, MinterResponse, TokenInfoResponse};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};

use xchain_bridge::msg::{
    DepositResponse, ExecuteMsg, InstantiateMsg, LastNonceResponse, NonceResponse, QueryMsg,
};
use xchain_bridge::{ContractError, TokenType, UniversalAddress};
use xchain_common::hash::encode_token_identifier;
use xchain_common::compute_transfer_hash;

const ADMIN: &str = "terra1admin";
const OPERATOR: &str = "terra1operator";
const CANCELER: &str = "terra1canceler";
const FEE_RECIPIENT: &str = "terra1feerecipient";
const USER: &str = "terra1zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg38edzs0";

const THIS_CHAIN: [u8; 4] = [0, 0, 0, 2];
const BSC: [u8; 4] = [0, 0, 0, 56];
const ETH: [u8; 4] = [0, 0, 0, 1];

const EVM_RECIPIENT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

// ============================================================================
// Test Setup
// ============================================================================

fn contract_bridge() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        xchain_bridge::contract::execute,
        xchain_bridge::contract::instantiate,
        xchain_bridge::contract::query,
    )
    .with_reply(xchain_bridge::contract::reply);
    Box::new(contract)
}

fn contract_cw20() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

struct TestEnv {
    app: App,
    bridge: Addr,
    admin: Addr,
    user: Addr,
}

fn setup() -> TestEnv {
    let mut app = App::default();
    let admin = Addr::unchecked(ADMIN);
    let user = Addr::unchecked(USER);

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(
                storage,
                &user,
                vec![
                    Coin::new(10_000_000_000, "uluna"),
                    Coin::new(10_000_000_000, "uusd"),
                ],
            )
            .unwrap();
    });

    let code_id = app.store_code(contract_bridge());
    let bridge = app
        .instantiate_contract(
            code_id,
            admin.clone(),
            &InstantiateMsg {
                admin: ADMIN.to_string(),
                operators: vec![OPERATOR.to_string()],
                cancelers: vec![CANCELER.to_string()],
                this_chain_id: Binary::from(THIS_CHAIN.to_vec()),
                native_denom: "uluna".to_string(),
                fee_recipient: FEE_RECIPIENT.to_string(),
                standard_fee_bps: None,
                cancel_window: None,
            },
            &[],
            "xchain-bridge",
            Some(ADMIN.to_string()),
        )
        .unwrap();

    let mut env = TestEnv {
        app,
        bridge,
        admin,
        user,
    };

    admin_exec(
        &mut env,
        ExecuteMsg::RegisterChain {
            identifier: "evm_56".to_string(),
            chain_id: Binary::from(BSC.to_vec()),
        },
    );
    admin_exec(
        &mut env,
        ExecuteMsg::RegisterChain {
            identifier: "evm_1".to_string(),
            chain_id: Binary::from(ETH.to_vec()),
        },
    );
    admin_exec(
        &mut env,
        ExecuteMsg::AddToken {
            token: "uluna".to_string(),
            is_native: true,
            token_type: TokenType::LockUnlock,
            decimals: 6,
        },
    );
    admin_exec(
        &mut env,
        ExecuteMsg::SetTokenDestination {
            token: "uluna".to_string(),
            dest_chain: Binary::from(BSC.to_vec()),
            dest_token: Binary::from(bsc_token().to_vec()),
            dest_decimals: 18,
        },
    );

    env
}

fn admin_exec(env: &mut TestEnv, msg: ExecuteMsg) -> AppResponse {
    env.app
        .execute_contract(env.admin.clone(), env.bridge.clone(), &msg, &[])
        .unwrap()
}

fn bsc_token() -> [u8; 32] {
    let mut token = [0u8; 32];
    token[12..].copy_from_slice(
        &hex::decode("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap(),
    );
    token
}

fn evm_recipient() -> [u8; 32] {
    UniversalAddress::from_evm(EVM_RECIPIENT)
        .unwrap()
        .to_bytes32()
}

fn deposit_native_msg(dest_chain: [u8; 4]) -> ExecuteMsg {
    ExecuteMsg::DepositNative {
        dest_chain: Binary::from(dest_chain.to_vec()),
        dest_account: Binary::from(evm_recipient().to_vec()),
    }
}

fn attr(res: &AppResponse, key: &str) -> String {
    res.events
        .iter()
        .flat_map(|e| &e.attributes)
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
        .unwrap_or_else(|| panic!("attribute {key} not found"))
}

fn assert_contract_err(err: anyhow::Error, expected: ContractError) {
    assert_eq!(err.root_cause().to_string(), expected.to_string());
}

fn query_deposit_by_nonce(env: &TestEnv, nonce: u64) -> Option<DepositResponse> {
    env.app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::DepositByNonce { nonce })
        .unwrap()
}

fn cw20_balance(env: &TestEnv, token: &Addr, account: &str) -> Uint128 {
    let res: BalanceResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            token,
            &Cw20QueryMsg::Balance {
                address: account.to_string(),
            },
        )
        .unwrap();
    res.balance
}

fn instantiate_cw20(env: &mut TestEnv, symbol: &str, minter: Option<String>) -> Addr {
    let code_id = env.app.store_code(contract_cw20());
    env.app
        .instantiate_contract(
            code_id,
            env.admin.clone(),
            &cw20_base::msg::InstantiateMsg {
                name: format!("{symbol} Token"),
                symbol: symbol.to_string(),
                decimals: 6,
                initial_balances: vec![Cw20Coin {
                    address: USER.to_string(),
                    amount: Uint128::new(5_000_000),
                }],
                mint: minter.map(|minter| MinterResponse { minter, cap: None }),
                marketing: None,
            },
            &[],
            symbol,
            None,
        )
        .unwrap()
}

fn register_cw20(env: &mut TestEnv, token: &Addr, token_type: TokenType) {
    admin_exec(
        env,
        ExecuteMsg::AddToken {
            token: token.to_string(),
            is_native: false,
            token_type,
            decimals: 6,
        },
    );
    admin_exec(
        env,
        ExecuteMsg::SetTokenDestination {
            token: token.to_string(),
            dest_chain: Binary::from(BSC.to_vec()),
            dest_token: Binary::from([0x77u8; 32].to_vec()),
            dest_decimals: 18,
        },
    );
}

fn approve_bridge(env: &mut TestEnv, token: &Addr, amount: u128) {
    env.app
        .execute_contract(
            env.user.clone(),
            token.clone(),
            &Cw20ExecuteMsg::IncreaseAllowance {
                spender: env.bridge.to_string(),
                amount: Uint128::new(amount),
                expires: None,
            },
            &[],
        )
        .unwrap();
}

// ============================================================================
// Native Deposits
// ============================================================================

#[test]
fn test_native_deposit_records_transfer() {
    let mut env = setup();

    let res = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &deposit_native_msg(BSC),
            &coins(1_000_000, "uluna"),
        )
        .unwrap();

    // 0.5% standard fee
    assert_eq!(attr(&res, "nonce"), "1");
    assert_eq!(attr(&res, "fee"), "5000");
    assert_eq!(attr(&res, "fee_type"), "standard");

    let fee_balance = env.app.wrap().query_balance(FEE_RECIPIENT, "uluna").unwrap();
    assert_eq!(fee_balance.amount, Uint128::new(5_000));
    let bridge_balance = env.app.wrap().query_balance(&env.bridge, "uluna").unwrap();
    assert_eq!(bridge_balance.amount, Uint128::new(995_000));

    let locked: Uint128 = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.bridge,
            &QueryMsg::LockedBalance {
                token: "uluna".to_string(),
            },
        )
        .unwrap();
    assert_eq!(locked, Uint128::new(995_000));

    let deposit = query_deposit_by_nonce(&env, 1).unwrap();
    let src_account = UniversalAddress::from_cosmos(USER).unwrap().to_bytes32();
    assert_eq!(deposit.nonce, 1);
    assert_eq!(deposit.amount, Uint128::new(995_000));
    assert_eq!(deposit.fee, Uint128::new(5_000));
    assert_eq!(deposit.src_account.as_slice(), &src_account);
    assert_eq!(deposit.dest_token.as_slice(), &bsc_token());
    assert_eq!(deposit.token, "uluna");

    let expected = compute_transfer_hash(
        &THIS_CHAIN,
        &BSC,
        &src_account,
        &evm_recipient(),
        &bsc_token(),
        995_000,
        1,
    );
    assert_eq!(deposit.transfer_hash.as_slice(), &expected);
    assert_eq!(attr(&res, "transfer_hash"), format!("0x{}", hex::encode(expected)));

    // The same record is reachable by hash
    let by_hash: Option<DepositResponse> = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.bridge,
            &QueryMsg::Deposit {
                transfer_hash: deposit.transfer_hash.clone(),
            },
        )
        .unwrap();
    assert_eq!(by_hash, Some(deposit.clone()));

    // And the query recomputes it from raw fields
    let computed: Binary = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.bridge,
            &QueryMsg::ComputeTransferHash {
                src_chain: Binary::from(THIS_CHAIN.to_vec()),
                dest_chain: Binary::from(BSC.to_vec()),
                src_account: deposit.src_account.clone(),
                dest_account: deposit.dest_account.clone(),
                token: deposit.dest_token.clone(),
                amount: deposit.amount,
                nonce: 1,
            },
        )
        .unwrap();
    assert_eq!(computed, deposit.transfer_hash);
}

#[test]
fn test_nonces_increase_by_one() {
    let mut env = setup();

    let last: LastNonceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::LastDepositNonce {})
        .unwrap();
    assert_eq!(last.nonce, None);

    for expected in 1..=3u64 {
        let res = env
            .app
            .execute_contract(
                env.user.clone(),
                env.bridge.clone(),
                &deposit_native_msg(BSC),
                &coins(1_000_000, "uluna"),
            )
            .unwrap();
        assert_eq!(attr(&res, "nonce"), expected.to_string());
    }

    let next: NonceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::NextDepositNonce {})
        .unwrap();
    assert_eq!(next.nonce, 4);

    let last: LastNonceResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.bridge, &QueryMsg::LastDepositNonce {})
        .unwrap();
    assert_eq!(last.nonce, Some(3));

    // Identical deposits still get distinct hashes
    let first = query_deposit_by_nonce(&env, 1).unwrap();
    let second = query_deposit_by_nonce(&env, 2).unwrap();
    assert_ne!(first.transfer_hash, second.transfer_hash);
    assert!(query_deposit_by_nonce(&env, 4).is_none());
}

#[test]
fn test_native_deposit_rejections() {
    let mut env = setup();
    let user = env.user.clone();
    let bridge = env.bridge.clone();

    // Unregistered destination chain
    let err = env
        .app
        .execute_contract(
            user.clone(),
            bridge.clone(),
            &deposit_native_msg([0, 0, 0, 99]),
            &coins(1_000, "uluna"),
        )
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::ChainNotRegistered {
            chain_id: "0x00000063".to_string(),
        },
    );

    // Registered chain without a token mapping
    let err = env
        .app
        .execute_contract(
            user.clone(),
            bridge.clone(),
            &deposit_native_msg(ETH),
            &coins(1_000, "uluna"),
        )
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::DestTokenMappingNotSet {
            token: "uluna".to_string(),
            chain_id: "0x00000001".to_string(),
        },
    );

    // Zero destination account
    let err = env
        .app
        .execute_contract(
            user.clone(),
            bridge.clone(),
            &ExecuteMsg::DepositNative {
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from([0u8; 32].to_vec()),
            },
            &coins(1_000, "uluna"),
        )
        .unwrap_err();
    assert_contract_err(err, ContractError::InvalidDestAccount);

    // Left-padded EVM address with no chain type
    let mut untyped = [0u8; 32];
    untyped[12..].copy_from_slice(&[0xf3u8; 20]);
    // EVM address with a dirty reserved tail
    let mut dirty_reserved = evm_recipient();
    dirty_reserved[31] = 1;
    for dest_account in [untyped, dirty_reserved] {
        let err = env
            .app
            .execute_contract(
                user.clone(),
                bridge.clone(),
                &ExecuteMsg::DepositNative {
                    dest_chain: Binary::from(BSC.to_vec()),
                    dest_account: Binary::from(dest_account.to_vec()),
                },
                &coins(1_000, "uluna"),
            )
            .unwrap_err();
        assert_contract_err(err, ContractError::InvalidDestAccount);
    }

    // No funds
    let err = env
        .app
        .execute_contract(user.clone(), bridge.clone(), &deposit_native_msg(BSC), &[])
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::InvalidAmount {
            amount: Uint128::zero(),
        },
    );

    // More than one denom
    let err = env
        .app
        .execute_contract(
            user.clone(),
            bridge.clone(),
            &deposit_native_msg(BSC),
            &[Coin::new(1_000, "uluna"), Coin::new(1_000, "uusd")],
        )
        .unwrap_err();
    assert!(err.root_cause().to_string().starts_with("Invalid funds"));

    // Unregistered denom
    let err = env
        .app
        .execute_contract(
            user.clone(),
            bridge.clone(),
            &deposit_native_msg(BSC),
            &coins(1_000, "uusd"),
        )
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::TokenNotRegistered {
            token: "uusd".to_string(),
        },
    );

    // Nothing was recorded
    assert!(query_deposit_by_nonce(&env, 1).is_none());
}

#[test]
fn test_paused_bridge_rejects_deposits() {
    let mut env = setup();
    admin_exec(&mut env, ExecuteMsg::Pause {});

    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &deposit_native_msg(BSC),
            &coins(1_000, "uluna"),
        )
        .unwrap_err();
    assert_contract_err(err, ContractError::BridgePaused);

    admin_exec(&mut env, ExecuteMsg::Unpause {});
    env.app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &deposit_native_msg(BSC),
            &coins(1_000, "uluna"),
        )
        .unwrap();
}

#[test]
fn test_disabled_token_rejects_deposits() {
    let mut env = setup();
    admin_exec(
        &mut env,
        ExecuteMsg::SetTokenEnabled {
            token: "uluna".to_string(),
            enabled: false,
        },
    );

    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &deposit_native_msg(BSC),
            &coins(1_000, "uluna"),
        )
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::TokenNotRegistered {
            token: "uluna".to_string(),
        },
    );
}

// ============================================================================
// CW20 Deposits
// ============================================================================

#[test]
fn test_cw20_lock_deposit() {
    let mut env = setup();
    let token = instantiate_cw20(&mut env, "LOCK", None);
    register_cw20(&mut env, &token, TokenType::LockUnlock);
    approve_bridge(&mut env, &token, 1_000_000);

    let res = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &ExecuteMsg::DepositCw20 {
                token: token.to_string(),
                amount: Uint128::new(1_000_000),
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from(evm_recipient().to_vec()),
            },
            &[],
        )
        .unwrap();
    assert_eq!(attr(&res, "custody_action"), "lock");

    assert_eq!(cw20_balance(&env, &token, USER), Uint128::new(4_000_000));
    assert_eq!(cw20_balance(&env, &token, env.bridge.as_str()), Uint128::new(995_000));
    assert_eq!(cw20_balance(&env, &token, FEE_RECIPIENT), Uint128::new(5_000));

    let deposit = query_deposit_by_nonce(&env, 1).unwrap();
    assert_eq!(deposit.amount, Uint128::new(995_000));
    assert_eq!(deposit.token, token.to_string());
    assert_eq!(deposit.dest_token.as_slice(), &[0x77u8; 32]);
}

#[test]
fn test_cw20_deposit_rejects_native_funds_and_wrong_type() {
    let mut env = setup();
    let token = instantiate_cw20(&mut env, "LOCK", None);
    register_cw20(&mut env, &token, TokenType::LockUnlock);
    approve_bridge(&mut env, &token, 1_000_000);

    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &ExecuteMsg::DepositCw20 {
                token: token.to_string(),
                amount: Uint128::new(1_000),
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from(evm_recipient().to_vec()),
            },
            &coins(1, "uluna"),
        )
        .unwrap_err();
    assert!(err.root_cause().to_string().starts_with("Invalid funds"));

    // A lock/unlock token cannot go through the burn path
    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &ExecuteMsg::DepositCw20Mintable {
                token: token.to_string(),
                amount: Uint128::new(1_000),
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from(evm_recipient().to_vec()),
            },
            &[],
        )
        .unwrap_err();
    assert_contract_err(
        err,
        ContractError::WrongTokenType {
            token: token.to_string(),
            expected: "mint_burn".to_string(),
        },
    );
}

#[test]
fn test_cw20_deposit_without_allowance_fails() {
    let mut env = setup();
    let token = instantiate_cw20(&mut env, "LOCK", None);
    register_cw20(&mut env, &token, TokenType::LockUnlock);

    let err = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &ExecuteMsg::DepositCw20 {
                token: token.to_string(),
                amount: Uint128::new(1_000),
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from(evm_recipient().to_vec()),
            },
            &[],
        )
        .unwrap_err();
    assert!(err.root_cause().to_string().starts_with("Token call failed"));

    assert_eq!(cw20_balance(&env, &token, USER), Uint128::new(5_000_000));
    assert!(query_deposit_by_nonce(&env, 1).is_none());
}

#[test]
fn test_cw20_mintable_deposit_burns() {
    let mut env = setup();
    let bridge = env.bridge.to_string();
    let token = instantiate_cw20(&mut env, "WRAP", Some(bridge));
    register_cw20(&mut env, &token, TokenType::MintBurn);
    approve_bridge(&mut env, &token, 2_000_000);

    let res = env
        .app
        .execute_contract(
            env.user.clone(),
            env.bridge.clone(),
            &ExecuteMsg::DepositCw20Mintable {
                token: token.to_string(),
                amount: Uint128::new(2_000_000),
                dest_chain: Binary::from(BSC.to_vec()),
                dest_account: Binary::from(evm_recipient().to_vec()),
            },
            &[],
        )
        .unwrap();
    assert_eq!(attr(&res, "custody_action"), "burn");

    let info: TokenInfoResponse = env
        .app
        .wrap()
        .query_wasm_smart(&token, &Cw20QueryMsg::TokenInfo {})
        .unwrap();
    // 10_000 fee moved to the fee recipient, the rest burned
    assert_eq!(info.total_supply, Uint128::new(3_010_000));
    assert_eq!(cw20_balance(&env, &token, USER), Uint128::new(3_000_000));
    assert_eq!(cw20_balance(&env, &token, FEE_RECIPIENT), Uint128::new(10_000));
    assert_eq!(cw20_balance(&env, &token, env.bridge.as_str()), Uint128::zero());

    // Burned tokens are not tracked as locked liquidity
    let locked: Uint128 = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.bridge,
            &QueryMsg::LockedBalance {
                token: token.to_string(),
            },
        )
        .unwrap();
    assert_eq!(locked, Uint128::zero());

    let deposit = query_deposit_by_nonce(&env, 1).unwrap();
    let expected = compute_transfer_hash(
        &THIS_CHAIN,
        &BSC,
        &UniversalAddress::from_cosmos(USER).unwrap().to_bytes32(),
        &evm_recipient(),
        &[0x77u8; 32],
        1_990_000,
        1,
    );
    assert_eq!(deposit.transfer_hash.as_slice(), &expected);
}

#[test]
fn test_local_token_encoding_differs_from_remote() {
    // Deposits commit to the remote token, withdrawals to the local identifier
    assert_ne!(encode_token_identifier("uluna"), bsc_token());
}
