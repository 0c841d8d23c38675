//! Bridge Contract - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers
//! - `custody` - Token movement and the reply that verifies it

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdResult,
};
use cw2::set_contract_version;
use xchain_common::window::{
    is_valid_cancel_window, DEFAULT_CANCEL_WINDOW, MAX_CANCEL_WINDOW, MIN_CANCEL_WINDOW,
};

use crate::custody::{ensure_idle, handle_custody_reply};
use crate::error::ContractError;
use crate::execute::{
    execute_add_canceler, execute_add_operator, execute_add_token, execute_deposit_cw20,
    execute_deposit_cw20_mintable, execute_deposit_native, execute_pause, execute_register_chain,
    execute_remove_canceler, execute_remove_custom_account_fee, execute_remove_operator,
    execute_set_cancel_window, execute_set_custom_account_fee, execute_set_fee_params,
    execute_set_token_destination, execute_set_token_enabled, execute_unpause,
    execute_unregister_chain, execute_withdraw_approve, execute_withdraw_cancel,
    execute_withdraw_execute_mint, execute_withdraw_execute_unlock, execute_withdraw_submit,
    execute_withdraw_uncancel,
};
use crate::fee_manager::{FeeConfig, FEE_CONFIG};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_account_fee, query_calculate_fee, query_cancel_window, query_cancelers, query_chain,
    query_chains, query_compute_transfer_hash, query_config, query_deposit,
    query_deposit_by_nonce, query_fee_config, query_last_deposit_nonce, query_locked_balance,
    query_next_deposit_nonce, query_operators, query_pending_withdraw, query_this_chain_id,
    query_token, query_token_dest_mapping,
};
use crate::registry::parse_chain_id;
use crate::roles::{CANCELERS, OPERATORS};
use crate::state::{
    Config, CANCEL_WINDOW, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, DEPOSIT_NONCE,
    INITIAL_DEPOSIT_NONCE,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let fee_recipient = deps.api.addr_validate(&msg.fee_recipient)?;
    let this_chain_id = parse_chain_id(msg.this_chain_id.as_slice())?;

    if msg.native_denom.is_empty() {
        return Err(ContractError::InvalidFunds {
            reason: "native_denom must not be empty".to_string(),
        });
    }

    let cancel_window = msg.cancel_window.unwrap_or(DEFAULT_CANCEL_WINDOW);
    if !is_valid_cancel_window(cancel_window) {
        return Err(ContractError::CancelWindowOutOfBounds {
            given: cancel_window,
            min: MIN_CANCEL_WINDOW,
            max: MAX_CANCEL_WINDOW,
        });
    }

    let config = Config {
        admin,
        paused: false,
        this_chain_id,
        native_denom: msg.native_denom,
    };
    CONFIG.save(deps.storage, &config)?;
    CANCEL_WINDOW.save(deps.storage, &cancel_window)?;
    DEPOSIT_NONCE.save(deps.storage, &INITIAL_DEPOSIT_NONCE)?;

    let mut fee_config = FeeConfig::default_with_recipient(fee_recipient);
    if let Some(bps) = msg.standard_fee_bps {
        fee_config.standard_fee_bps = bps;
    }
    fee_config.validate()?;
    FEE_CONFIG.save(deps.storage, &fee_config)?;

    for operator in &msg.operators {
        let operator = deps.api.addr_validate(operator)?;
        OPERATORS.add(deps.storage, &operator)?;
    }
    for canceler in &msg.cancelers {
        let canceler = deps.api.addr_validate(canceler)?;
        CANCELERS.add(deps.storage, &canceler)?;
    }

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("operator_count", msg.operators.len().to_string())
        .add_attribute("canceler_count", msg.cancelers.len().to_string())
        .add_attribute("cancel_window", cancel_window.to_string())
        .add_attribute("this_chain_id", format!("0x{}", hex::encode(this_chain_id))))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    // No state changes while a custody transfer awaits verification
    ensure_idle(deps.storage)?;

    match msg {
        // Outgoing transfers
        ExecuteMsg::DepositNative {
            dest_chain,
            dest_account,
        } => execute_deposit_native(deps, env, info, dest_chain, dest_account),
        ExecuteMsg::DepositCw20 {
            token,
            amount,
            dest_chain,
            dest_account,
        } => execute_deposit_cw20(deps, env, info, token, amount, dest_chain, dest_account),
        ExecuteMsg::DepositCw20Mintable {
            token,
            amount,
            dest_chain,
            dest_account,
        } => execute_deposit_cw20_mintable(
            deps,
            env,
            info,
            token,
            amount,
            dest_chain,
            dest_account,
        ),

        // Incoming transfers
        ExecuteMsg::WithdrawSubmit {
            src_chain,
            src_account,
            token,
            recipient,
            amount,
            nonce,
            src_decimals,
        } => execute_withdraw_submit(
            deps,
            env,
            info,
            src_chain,
            src_account,
            token,
            recipient,
            amount,
            nonce,
            src_decimals,
        ),
        ExecuteMsg::WithdrawApprove { withdraw_hash, fee } => {
            execute_withdraw_approve(deps, env, info, withdraw_hash, fee)
        }
        ExecuteMsg::WithdrawCancel { withdraw_hash } => {
            execute_withdraw_cancel(deps, env, info, withdraw_hash)
        }
        ExecuteMsg::WithdrawUncancel { withdraw_hash } => {
            execute_withdraw_uncancel(deps, env, info, withdraw_hash)
        }
        ExecuteMsg::WithdrawExecuteUnlock { withdraw_hash } => {
            execute_withdraw_execute_unlock(deps, env, info, withdraw_hash)
        }
        ExecuteMsg::WithdrawExecuteMint { withdraw_hash } => {
            execute_withdraw_execute_mint(deps, env, info, withdraw_hash)
        }

        // Configuration
        ExecuteMsg::SetCancelWindow { seconds } => execute_set_cancel_window(deps, info, seconds),
        ExecuteMsg::AddOperator { address } => execute_add_operator(deps, info, address),
        ExecuteMsg::RemoveOperator { address } => execute_remove_operator(deps, info, address),
        ExecuteMsg::AddCanceler { address } => execute_add_canceler(deps, info, address),
        ExecuteMsg::RemoveCanceler { address } => execute_remove_canceler(deps, info, address),

        // Chain & token management
        ExecuteMsg::RegisterChain {
            identifier,
            chain_id,
        } => execute_register_chain(deps, info, identifier, chain_id),
        ExecuteMsg::UnregisterChain { chain_id } => execute_unregister_chain(deps, info, chain_id),
        ExecuteMsg::AddToken {
            token,
            is_native,
            token_type,
            decimals,
        } => execute_add_token(deps, info, token, is_native, token_type, decimals),
        ExecuteMsg::SetTokenEnabled { token, enabled } => {
            execute_set_token_enabled(deps, info, token, enabled)
        }
        ExecuteMsg::SetTokenDestination {
            token,
            dest_chain,
            dest_token,
            dest_decimals,
        } => {
            execute_set_token_destination(deps, info, token, dest_chain, dest_token, dest_decimals)
        }

        // Fees
        ExecuteMsg::SetFeeParams {
            standard_fee_bps,
            discounted_fee_bps,
            cl8y_threshold,
            cl8y_token,
            fee_recipient,
        } => execute_set_fee_params(
            deps,
            info,
            standard_fee_bps,
            discounted_fee_bps,
            cl8y_threshold,
            cl8y_token,
            fee_recipient,
        ),
        ExecuteMsg::SetCustomAccountFee { account, fee_bps } => {
            execute_set_custom_account_fee(deps, info, account, fee_bps)
        }
        ExecuteMsg::RemoveCustomAccountFee { account } => {
            execute_remove_custom_account_fee(deps, info, account)
        }

        // Admin operations
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
    }
}

// ============================================================================
// Reply
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, env: Env, msg: Reply) -> Result<Response, ContractError> {
    handle_custody_reply(deps, env, msg)
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        // Core queries
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::ThisChainId {} => to_json_binary(&query_this_chain_id(deps)?),
        QueryMsg::CancelWindow {} => to_json_binary(&query_cancel_window(deps)?),

        // Deposits
        QueryMsg::NextDepositNonce {} => to_json_binary(&query_next_deposit_nonce(deps)?),
        QueryMsg::LastDepositNonce {} => to_json_binary(&query_last_deposit_nonce(deps)?),
        QueryMsg::Deposit { transfer_hash } => {
            to_json_binary(&query_deposit(deps, transfer_hash)?)
        }
        QueryMsg::DepositByNonce { nonce } => to_json_binary(&query_deposit_by_nonce(deps, nonce)?),

        // Withdrawals
        QueryMsg::PendingWithdraw { withdraw_hash } => {
            to_json_binary(&query_pending_withdraw(deps, env, withdraw_hash)?)
        }
        QueryMsg::ComputeTransferHash {
            src_chain,
            dest_chain,
            src_account,
            dest_account,
            token,
            amount,
            nonce,
        } => to_json_binary(&query_compute_transfer_hash(
            src_chain,
            dest_chain,
            src_account,
            dest_account,
            token,
            amount,
            nonce,
        )?),

        // Fees
        QueryMsg::FeeConfig {} => to_json_binary(&query_fee_config(deps)?),
        QueryMsg::AccountFee { account } => to_json_binary(&query_account_fee(deps, account)?),
        QueryMsg::CalculateFee { depositor, amount } => {
            to_json_binary(&query_calculate_fee(deps, depositor, amount)?)
        }

        // Roles & registries
        QueryMsg::Operators {} => to_json_binary(&query_operators(deps)?),
        QueryMsg::Cancelers {} => to_json_binary(&query_cancelers(deps)?),
        QueryMsg::Chain { chain_id } => to_json_binary(&query_chain(deps, chain_id)?),
        QueryMsg::Chains {} => to_json_binary(&query_chains(deps)?),
        QueryMsg::Token { token } => to_json_binary(&query_token(deps, token)?),
        QueryMsg::TokenDestMapping { token, dest_chain } => {
            to_json_binary(&query_token_dest_mapping(deps, token, dest_chain)?)
        }
        QueryMsg::LockedBalance { token } => to_json_binary(&query_locked_balance(deps, token)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("method", "migrate"))
}
