//! Outgoing transfer handlers.
//!
//! A deposit charges the depositor's fee, takes custody of the net amount,
//! assigns the next nonce and records the transfer under its hash so the
//! destination chain's withdrawal can be matched against it.

use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, Binary, CosmosMsg, DepsMut, Env, MessageInfo, Response,
    Storage, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;
use xchain_common::address_codec::decode_strict;
use xchain_common::hash::{bytes32_to_hex, bytes4_to_hex, compute_transfer_hash};

use crate::custody::{dispatch, increase_locked};
use crate::error::ContractError;
use crate::execute::encode_local_account;
use crate::fee_manager::{calculate_fee_from_bps, get_effective_fee_bps, FEE_CONFIG};
use crate::registry::{
    get_dest_token_mapping, load_token, parse_chain_id, revert_if_not_registered, TokenEntry,
    TokenType,
};
use crate::state::{DepositRecord, CONFIG, DEPOSITS, DEPOSIT_BY_NONCE, DEPOSIT_NONCE};

/// Deposit the native coin attached to the message
pub fn execute_deposit_native(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    dest_chain: Binary,
    dest_account: Binary,
) -> Result<Response, ContractError> {
    let coin = match info.funds.as_slice() {
        [coin] => coin.clone(),
        [] => {
            return Err(ContractError::InvalidAmount {
                amount: Uint128::zero(),
            })
        }
        _ => {
            return Err(ContractError::InvalidFunds {
                reason: "only one denom allowed per deposit".to_string(),
            })
        }
    };

    let token = load_token(deps.storage, &coin.denom)?;
    if !token.is_native || token.token_type != TokenType::LockUnlock {
        return Err(ContractError::WrongTokenType {
            token: token.token,
            expected: "native lock_unlock".to_string(),
        });
    }

    execute_deposit(
        deps,
        env,
        info.sender,
        token,
        coin.amount,
        dest_chain,
        dest_account,
    )
}

/// Lock a CW20 token pulled from the depositor's allowance
pub fn execute_deposit_cw20(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    dest_chain: Binary,
    dest_account: Binary,
) -> Result<Response, ContractError> {
    let token = load_cw20(deps.storage, &info, &token, TokenType::LockUnlock)?;
    execute_deposit(deps, env, info.sender, token, amount, dest_chain, dest_account)
}

/// Burn a mintable CW20 token from the depositor's allowance
pub fn execute_deposit_cw20_mintable(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    dest_chain: Binary,
    dest_account: Binary,
) -> Result<Response, ContractError> {
    let token = load_cw20(deps.storage, &info, &token, TokenType::MintBurn)?;
    execute_deposit(deps, env, info.sender, token, amount, dest_chain, dest_account)
}

fn load_cw20(
    storage: &dyn Storage,
    info: &MessageInfo,
    token: &str,
    expected: TokenType,
) -> Result<TokenEntry, ContractError> {
    if !info.funds.is_empty() {
        return Err(ContractError::InvalidFunds {
            reason: "CW20 deposits do not accept native coins".to_string(),
        });
    }
    let entry = load_token(storage, token)?;
    if entry.is_native || entry.token_type != expected {
        return Err(ContractError::WrongTokenType {
            token: entry.token,
            expected: expected.as_str().to_string(),
        });
    }
    Ok(entry)
}

fn parse_dest_account(bytes: &Binary) -> Result<[u8; 32], ContractError> {
    let account: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidDestAccount)?;
    // Must be a chain-tagged universal address with zero reserved bytes
    decode_strict(&account).map_err(|_| ContractError::InvalidDestAccount)?;
    Ok(account)
}

fn execute_deposit(
    deps: DepsMut,
    env: Env,
    depositor: Addr,
    token: TokenEntry,
    amount: Uint128,
    dest_chain: Binary,
    dest_account: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    if amount.is_zero() {
        return Err(ContractError::InvalidAmount { amount });
    }

    let dest_chain = parse_chain_id(dest_chain.as_slice())?;
    revert_if_not_registered(deps.storage, &dest_chain)?;
    let mapping = get_dest_token_mapping(deps.storage, &token.token, &dest_chain)?;
    let dest_account = parse_dest_account(&dest_account)?;
    let src_account = encode_local_account(&depositor)?;

    // Fee
    let fee_config = FEE_CONFIG.load(deps.storage)?;
    let (fee_bps, fee_type) = get_effective_fee_bps(deps.as_ref(), &fee_config, &depositor)?;
    let fee = calculate_fee_from_bps(amount, fee_bps);
    let net_amount = amount - fee;

    // Nonce is the counter value before the increment
    let nonce = DEPOSIT_NONCE.load(deps.storage)?;
    DEPOSIT_NONCE.save(deps.storage, &(nonce + 1))?;

    let transfer_hash = compute_transfer_hash(
        &config.this_chain_id,
        &dest_chain,
        &src_account,
        &dest_account,
        &mapping.dest_token,
        net_amount.u128(),
        nonce,
    );

    let record = DepositRecord {
        nonce,
        src_account,
        dest_chain,
        dest_account,
        dest_token: mapping.dest_token,
        token: token.token.clone(),
        amount: net_amount,
        fee,
        timestamp: env.block.time.seconds(),
    };
    DEPOSITS.save(deps.storage, &transfer_hash, &record)?;
    DEPOSIT_BY_NONCE.save(deps.storage, nonce, &transfer_hash)?;

    if token.token_type == TokenType::LockUnlock {
        increase_locked(deps.storage, &token.token, net_amount)?;
    }

    // Custody of the net amount runs first; the fee transfer follows
    let mut response = Response::new();
    let custody = token
        .token_type
        .custody()
        .escrow(deps.as_ref(), &env, &token, &depositor, net_amount)?;
    if let Some(transfer) = custody {
        response = response.add_submessage(dispatch(deps.storage, transfer)?);
    }

    if !fee.is_zero() {
        response = response.add_message(fee_message(
            &token,
            &depositor,
            &fee_config.fee_recipient,
            fee,
        )?);
    }

    Ok(response
        .add_attribute("method", "deposit")
        .add_attribute("transfer_hash", bytes32_to_hex(&transfer_hash))
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("src_account", bytes32_to_hex(&src_account))
        .add_attribute("dest_chain", bytes4_to_hex(&dest_chain))
        .add_attribute("dest_token", bytes32_to_hex(&mapping.dest_token))
        .add_attribute("dest_account", bytes32_to_hex(&dest_account))
        .add_attribute("token", token.token)
        .add_attribute("amount", net_amount.to_string())
        .add_attribute("fee", fee.to_string())
        .add_attribute("fee_type", fee_type.as_str()))
}

/// Pay the deposit fee to the fee recipient straight from the depositor's funds
fn fee_message(
    token: &TokenEntry,
    depositor: &Addr,
    fee_recipient: &Addr,
    fee: Uint128,
) -> Result<CosmosMsg, ContractError> {
    if token.is_native {
        // native coins were attached to the deposit and already sit with the bridge
        return Ok(CosmosMsg::Bank(BankMsg::Send {
            to_address: fee_recipient.to_string(),
            amount: coins(fee.u128(), &token.token),
        }));
    }
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.token.clone(),
        msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
            owner: depositor.to_string(),
            recipient: fee_recipient.to_string(),
            amount: fee,
        })?,
        funds: vec![],
    }))
}
