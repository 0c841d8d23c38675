//! Query handlers for the bridge contract.

use cosmwasm_std::{Addr, Binary, Deps, Env, StdError, StdResult, Uint128};
use xchain_common::compute_transfer_hash;

use crate::fee_manager::{calculate_fee_from_bps, get_effective_fee_bps, FeeConfig, FEE_CONFIG};
use crate::msg::{
    AccountFeeResponse, CalculateFeeResponse, CancelWindowResponse, ChainResponse, ConfigResponse,
    DepositResponse, LastNonceResponse, NonceResponse, PendingWithdrawResponse,
    TokenDestMappingResponse,
};
use crate::registry::{list_chains, ChainEntry, TokenEntry, CHAINS, TOKENS, TOKEN_DEST_MAPPINGS};
use crate::roles::{CANCELERS, OPERATORS};
use crate::state::{
    DepositRecord, CANCEL_WINDOW, CONFIG, DEPOSITS, DEPOSIT_BY_NONCE, DEPOSIT_NONCE,
    INITIAL_DEPOSIT_NONCE, LOCKED_BALANCES, PENDING_WITHDRAWS,
};

// ============================================================================
// Core Queries
// ============================================================================

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        paused: config.paused,
        this_chain_id: Binary::from(config.this_chain_id.to_vec()),
        native_denom: config.native_denom,
    })
}

pub fn query_this_chain_id(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    Ok(Binary::from(config.this_chain_id.to_vec()))
}

pub fn query_cancel_window(deps: Deps) -> StdResult<CancelWindowResponse> {
    Ok(CancelWindowResponse {
        cancel_window_seconds: CANCEL_WINDOW.load(deps.storage)?,
    })
}

// ============================================================================
// Deposits
// ============================================================================

pub fn query_next_deposit_nonce(deps: Deps) -> StdResult<NonceResponse> {
    Ok(NonceResponse {
        nonce: DEPOSIT_NONCE.load(deps.storage)?,
    })
}

pub fn query_last_deposit_nonce(deps: Deps) -> StdResult<LastNonceResponse> {
    let next = DEPOSIT_NONCE.load(deps.storage)?;
    let nonce = (next > INITIAL_DEPOSIT_NONCE).then(|| next - 1);
    Ok(LastNonceResponse { nonce })
}

pub fn query_deposit(deps: Deps, transfer_hash: Binary) -> StdResult<Option<DepositResponse>> {
    let hash = parse_hash(&transfer_hash)?;
    Ok(DEPOSITS
        .may_load(deps.storage, &hash)?
        .map(|record| deposit_response(hash, record)))
}

pub fn query_deposit_by_nonce(deps: Deps, nonce: u64) -> StdResult<Option<DepositResponse>> {
    let Some(hash) = DEPOSIT_BY_NONCE.may_load(deps.storage, nonce)? else {
        return Ok(None);
    };
    let record = DEPOSITS.load(deps.storage, &hash)?;
    Ok(Some(deposit_response(hash, record)))
}

fn deposit_response(hash: [u8; 32], record: DepositRecord) -> DepositResponse {
    DepositResponse {
        transfer_hash: Binary::from(hash.to_vec()),
        nonce: record.nonce,
        src_account: Binary::from(record.src_account.to_vec()),
        dest_chain: Binary::from(record.dest_chain.to_vec()),
        dest_account: Binary::from(record.dest_account.to_vec()),
        dest_token: Binary::from(record.dest_token.to_vec()),
        token: record.token,
        amount: record.amount,
        fee: record.fee,
        timestamp: record.timestamp,
    }
}

// ============================================================================
// Withdrawals
// ============================================================================

pub fn query_pending_withdraw(
    deps: Deps,
    env: Env,
    withdraw_hash: Binary,
) -> StdResult<Option<PendingWithdrawResponse>> {
    let hash = parse_hash(&withdraw_hash)?;
    let Some(w) = PENDING_WITHDRAWS.may_load(deps.storage, &hash)? else {
        return Ok(None);
    };

    let window = CANCEL_WINDOW.load(deps.storage)?;
    let status = w.status(window, env.block.time.seconds());
    let cancel_window_end = if w.approved {
        w.cancel_window_end(window)
    } else {
        0
    };

    Ok(Some(PendingWithdrawResponse {
        withdraw_hash,
        src_chain: Binary::from(w.src_chain.to_vec()),
        src_account: Binary::from(w.src_account.to_vec()),
        dest_account: Binary::from(w.dest_account.to_vec()),
        token: w.token,
        recipient: w.recipient,
        amount: w.amount,
        nonce: w.nonce,
        src_decimals: w.src_decimals,
        dest_decimals: w.dest_decimals,
        operator_gas: w.operator_gas,
        fee: w.fee,
        fee_recipient: w.fee_recipient,
        deduct_from_amount: w.deduct_from_amount,
        submitted_at: w.submitted_at,
        approved_at: w.approved_at,
        approved: w.approved,
        cancelled: w.cancelled,
        executed: w.executed,
        status,
        cancel_window_end,
    }))
}

#[allow(clippy::too_many_arguments)]
pub fn query_compute_transfer_hash(
    src_chain: Binary,
    dest_chain: Binary,
    src_account: Binary,
    dest_account: Binary,
    token: Binary,
    amount: Uint128,
    nonce: u64,
) -> StdResult<Binary> {
    let src_chain: [u8; 4] = fixed_bytes(&src_chain, "src_chain")?;
    let dest_chain: [u8; 4] = fixed_bytes(&dest_chain, "dest_chain")?;
    let src_account: [u8; 32] = fixed_bytes(&src_account, "src_account")?;
    let dest_account: [u8; 32] = fixed_bytes(&dest_account, "dest_account")?;
    let token: [u8; 32] = fixed_bytes(&token, "token")?;

    let hash = compute_transfer_hash(
        &src_chain,
        &dest_chain,
        &src_account,
        &dest_account,
        &token,
        amount.u128(),
        nonce,
    );
    Ok(Binary::from(hash.to_vec()))
}

// ============================================================================
// Fees
// ============================================================================

pub fn query_fee_config(deps: Deps) -> StdResult<FeeConfig> {
    FEE_CONFIG.load(deps.storage)
}

pub fn query_account_fee(deps: Deps, account: String) -> StdResult<AccountFeeResponse> {
    let account = deps.api.addr_validate(&account)?;
    let config = FEE_CONFIG.load(deps.storage)?;
    let (fee_bps, fee_type) = get_effective_fee_bps(deps, &config, &account)?;
    Ok(AccountFeeResponse {
        account,
        fee_bps,
        fee_type: fee_type.as_str().to_string(),
    })
}

pub fn query_calculate_fee(
    deps: Deps,
    depositor: String,
    amount: Uint128,
) -> StdResult<CalculateFeeResponse> {
    let depositor = deps.api.addr_validate(&depositor)?;
    let config = FEE_CONFIG.load(deps.storage)?;
    let (fee_bps, fee_type) = get_effective_fee_bps(deps, &config, &depositor)?;
    let fee = calculate_fee_from_bps(amount, fee_bps);
    Ok(CalculateFeeResponse {
        depositor,
        amount,
        fee,
        net_amount: amount - fee,
        fee_bps,
        fee_type: fee_type.as_str().to_string(),
    })
}

// ============================================================================
// Roles & Registries
// ============================================================================

pub fn query_operators(deps: Deps) -> StdResult<Vec<Addr>> {
    OPERATORS.list(deps.storage)
}

pub fn query_cancelers(deps: Deps) -> StdResult<Vec<Addr>> {
    CANCELERS.list(deps.storage)
}

pub fn query_chain(deps: Deps, chain_id: Binary) -> StdResult<Option<ChainResponse>> {
    let chain_id: [u8; 4] = fixed_bytes(&chain_id, "chain_id")?;
    Ok(CHAINS
        .may_load(deps.storage, &chain_id)?
        .map(chain_response))
}

pub fn query_chains(deps: Deps) -> StdResult<Vec<ChainResponse>> {
    Ok(list_chains(deps.storage)?
        .into_iter()
        .map(chain_response)
        .collect())
}

fn chain_response(entry: ChainEntry) -> ChainResponse {
    ChainResponse {
        chain_id: Binary::from(entry.chain_id.to_vec()),
        identifier: entry.identifier,
        identifier_hash: Binary::from(entry.identifier_hash.to_vec()),
    }
}

pub fn query_token(deps: Deps, token: String) -> StdResult<Option<TokenEntry>> {
    TOKENS.may_load(deps.storage, &token)
}

pub fn query_token_dest_mapping(
    deps: Deps,
    token: String,
    dest_chain: Binary,
) -> StdResult<Option<TokenDestMappingResponse>> {
    let chain_id: [u8; 4] = fixed_bytes(&dest_chain, "dest_chain")?;
    Ok(TOKEN_DEST_MAPPINGS
        .may_load(deps.storage, (token.as_str(), chain_id.as_slice()))?
        .map(|mapping| TokenDestMappingResponse {
            token,
            dest_chain,
            dest_token: Binary::from(mapping.dest_token.to_vec()),
            dest_decimals: mapping.dest_decimals,
        }))
}

pub fn query_locked_balance(deps: Deps, token: String) -> StdResult<Uint128> {
    Ok(LOCKED_BALANCES
        .may_load(deps.storage, &token)?
        .unwrap_or_default())
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_hash(hash: &Binary) -> StdResult<[u8; 32]> {
    fixed_bytes(hash, "hash")
}

fn fixed_bytes<const N: usize>(value: &Binary, field: &str) -> StdResult<[u8; N]> {
    value.as_slice().try_into().map_err(|_| {
        StdError::generic_err(format!(
            "{} must be {} bytes, got {}",
            field,
            N,
            value.len()
        ))
    })
}
