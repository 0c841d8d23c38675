//! Incoming transfer handlers.
//!
//! 1. `WithdrawSubmit` - anyone registers the transfer (optionally tipping the operator)
//! 2. `WithdrawApprove` - operator approves after checking the source deposit; the cancel window starts
//! 3. `WithdrawCancel` - canceler vetoes inside the cancel window
//! 4. `WithdrawUncancel` - operator reverses a veto inside the cancel window, restarting it
//! 5. `WithdrawExecuteUnlock` / `WithdrawExecuteMint` - anyone pays out once the window has elapsed

use cosmwasm_std::{
    coins, BankMsg, Binary, CosmosMsg, DepsMut, Env, MessageInfo, Response, Storage, Uint128,
};
use xchain_common::address_codec::decode_strict;
use xchain_common::hash::{bytes32_to_hex, bytes4_to_hex, compute_transfer_hash, encode_token_identifier};
use xchain_common::normalize_decimals;

use crate::custody::{decrease_locked, dispatch};
use crate::error::ContractError;
use crate::execute::encode_local_account;
use crate::registry::{
    get_dest_token_mapping, load_token, parse_chain_id, revert_if_not_registered, TokenType,
};
use crate::roles::{ensure_canceler, ensure_operator};
use crate::state::{
    Config, PendingWithdraw, WithdrawFee, CANCEL_WINDOW, CONFIG, PENDING_WITHDRAWS,
    WITHDRAW_NONCE_APPROVED,
};

// ============================================================================
// WithdrawSubmit - anyone
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn execute_withdraw_submit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    src_chain: Binary,
    src_account: Binary,
    token: String,
    recipient: String,
    amount: Uint128,
    nonce: u64,
    src_decimals: u8,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    if amount.is_zero() {
        return Err(ContractError::InvalidAmount { amount });
    }

    let src_chain = parse_chain_id(src_chain.as_slice())?;
    revert_if_not_registered(deps.storage, &src_chain)?;
    let src_account: [u8; 32] =
        src_account
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::InvalidAddress {
                reason: format!("src_account must be 32 bytes, got {}", src_account.len()),
            })?;
    decode_strict(&src_account).map_err(|e| ContractError::InvalidAddress {
        reason: format!("src_account: {}", e),
    })?;

    // The recipient is what the depositor committed to as the destination account
    let recipient = deps.api.addr_validate(&recipient)?;
    let dest_account = encode_local_account(&recipient)?;

    let token_entry = load_token(deps.storage, &token)?;
    let mapping = get_dest_token_mapping(deps.storage, &token, &src_chain)?;
    if mapping.dest_decimals != src_decimals {
        return Err(ContractError::DecimalsMismatch {
            expected: mapping.dest_decimals,
            got: src_decimals,
        });
    }

    let withdraw_hash = compute_transfer_hash(
        &src_chain,
        &config.this_chain_id,
        &src_account,
        &dest_account,
        &encode_token_identifier(&token),
        amount.u128(),
        nonce,
    );

    if PENDING_WITHDRAWS.has(deps.storage, &withdraw_hash) {
        return Err(ContractError::WithdrawAlreadySubmitted {
            hash: bytes32_to_hex(&withdraw_hash),
        });
    }

    let operator_gas = native_funds(&config, &info)?;

    let pending = PendingWithdraw {
        src_chain,
        src_account,
        dest_account,
        token: token.clone(),
        recipient: recipient.clone(),
        amount,
        nonce,
        src_decimals,
        dest_decimals: token_entry.decimals,
        operator_gas,
        fee: Uint128::zero(),
        fee_recipient: None,
        deduct_from_amount: false,
        submitted_at: env.block.time.seconds(),
        approved_at: 0,
        approved: false,
        cancelled: false,
        executed: false,
    };
    PENDING_WITHDRAWS.save(deps.storage, &withdraw_hash, &pending)?;

    Ok(Response::new()
        .add_attribute("method", "withdraw_submit")
        .add_attribute("withdraw_hash", bytes32_to_hex(&withdraw_hash))
        .add_attribute("src_chain", bytes4_to_hex(&src_chain))
        .add_attribute("token", token)
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount.to_string())
        .add_attribute("nonce", nonce.to_string())
        .add_attribute("operator_gas", operator_gas.to_string()))
}

// ============================================================================
// WithdrawApprove - operator
// ============================================================================

pub fn execute_withdraw_approve(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
    fee: Option<WithdrawFee>,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let config = CONFIG.load(deps.storage)?;

    let hash = parse_hash(&withdraw_hash)?;
    let mut pending = load_pending(deps.storage, &hash)?;

    if pending.executed {
        return Err(ContractError::WithdrawAlreadyExecuted {
            hash: bytes32_to_hex(&hash),
        });
    }
    if pending.approved {
        return Err(ContractError::WithdrawAlreadyApproved {
            hash: bytes32_to_hex(&hash),
        });
    }

    ensure_nonce_unclaimed(deps.storage, &pending)?;

    if let Some(fee) = fee {
        let token = load_token(deps.storage, &pending.token)?;
        match (token.is_native, fee.deduct_from_amount) {
            (true, false) => return Err(ContractError::ApprovalRequiresNativePath),
            (false, true) => return Err(ContractError::ApprovalNotNativePath),
            _ => {}
        }
        if fee.deduct_from_amount {
            let payout = payout_amount(&pending)?;
            if fee.amount > payout {
                return Err(ContractError::FeeExceedsAmount {
                    fee: fee.amount,
                    amount: payout,
                });
            }
        }
        pending.fee = fee.amount;
        pending.fee_recipient = Some(deps.api.addr_validate(&fee.recipient)?);
        pending.deduct_from_amount = fee.deduct_from_amount;
    }

    pending.approved = true;
    pending.approved_at = env.block.time.seconds();
    PENDING_WITHDRAWS.save(deps.storage, &hash, &pending)?;
    WITHDRAW_NONCE_APPROVED.save(deps.storage, nonce_key(&pending), &true)?;

    let mut response = Response::new();
    if !pending.operator_gas.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(pending.operator_gas.u128(), &config.native_denom),
        });
    }

    Ok(response
        .add_attribute("method", "withdraw_approve")
        .add_attribute("withdraw_hash", bytes32_to_hex(&hash))
        .add_attribute("operator", info.sender)
        .add_attribute("approved_at", pending.approved_at.to_string())
        .add_attribute("fee", pending.fee.to_string()))
}

// ============================================================================
// WithdrawCancel - canceler
// ============================================================================

pub fn execute_withdraw_cancel(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
) -> Result<Response, ContractError> {
    ensure_canceler(deps.storage, &info.sender)?;

    let hash = parse_hash(&withdraw_hash)?;
    let mut pending = load_pending(deps.storage, &hash)?;

    if pending.executed {
        return Err(ContractError::WithdrawAlreadyExecuted {
            hash: bytes32_to_hex(&hash),
        });
    }
    if !pending.approved {
        return Err(ContractError::WithdrawNotApproved {
            hash: bytes32_to_hex(&hash),
        });
    }
    if pending.cancelled {
        return Err(ContractError::WithdrawCancelled {
            hash: bytes32_to_hex(&hash),
        });
    }
    ensure_window_open(deps.storage, &env, &pending)?;

    pending.cancelled = true;
    PENDING_WITHDRAWS.save(deps.storage, &hash, &pending)?;
    // Free the nonce so the genuine withdrawal for it can still be approved
    WITHDRAW_NONCE_APPROVED.remove(deps.storage, nonce_key(&pending));

    Ok(Response::new()
        .add_attribute("method", "withdraw_cancel")
        .add_attribute("withdraw_hash", bytes32_to_hex(&hash))
        .add_attribute("cancelled_by", info.sender))
}

// ============================================================================
// WithdrawUncancel - operator
// ============================================================================

pub fn execute_withdraw_uncancel(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;

    let hash = parse_hash(&withdraw_hash)?;
    let mut pending = load_pending(deps.storage, &hash)?;

    if pending.executed {
        return Err(ContractError::WithdrawAlreadyExecuted {
            hash: bytes32_to_hex(&hash),
        });
    }
    if !pending.cancelled {
        return Err(ContractError::WithdrawNotCancelled {
            hash: bytes32_to_hex(&hash),
        });
    }
    ensure_window_open(deps.storage, &env, &pending)?;
    ensure_nonce_unclaimed(deps.storage, &pending)?;

    pending.cancelled = false;
    pending.approved_at = env.block.time.seconds();
    PENDING_WITHDRAWS.save(deps.storage, &hash, &pending)?;
    WITHDRAW_NONCE_APPROVED.save(deps.storage, nonce_key(&pending), &true)?;

    Ok(Response::new()
        .add_attribute("method", "withdraw_uncancel")
        .add_attribute("withdraw_hash", bytes32_to_hex(&hash))
        .add_attribute("new_approved_at", pending.approved_at.to_string()))
}

// ============================================================================
// WithdrawExecute - anyone, after the cancel window
// ============================================================================

pub fn execute_withdraw_execute_unlock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
) -> Result<Response, ContractError> {
    execute_withdraw(deps, env, info, withdraw_hash, TokenType::LockUnlock)
}

pub fn execute_withdraw_execute_mint(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
) -> Result<Response, ContractError> {
    execute_withdraw(deps, env, info, withdraw_hash, TokenType::MintBurn)
}

fn execute_withdraw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    withdraw_hash: Binary,
    expected: TokenType,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }

    let hash = parse_hash(&withdraw_hash)?;
    let mut pending = load_and_validate_execution(deps.storage, &env, &hash)?;

    let token = load_token(deps.storage, &pending.token)?;
    if token.token_type != expected {
        return Err(ContractError::WrongTokenType {
            token: token.token,
            expected: expected.as_str().to_string(),
        });
    }

    let payout = payout_amount(&pending)?;
    let (to_recipient, deducted_fee) = if pending.deduct_from_amount {
        (payout - pending.fee, pending.fee)
    } else {
        (payout, Uint128::zero())
    };

    // Caller-paid fee: everything attached in the native denom goes to the fee recipient
    let attached = native_funds(&config, &info)?;
    let caller_fee = if pending.deduct_from_amount || pending.fee.is_zero() {
        if !attached.is_zero() {
            return Err(ContractError::InvalidFunds {
                reason: "no native fee due for this withdrawal".to_string(),
            });
        }
        Uint128::zero()
    } else {
        if attached < pending.fee {
            return Err(ContractError::InsufficientNativeValue {
                required: pending.fee,
                sent: attached,
            });
        }
        attached
    };

    if expected == TokenType::LockUnlock {
        decrease_locked(deps.storage, &token.token, payout)?;
    }

    pending.executed = true;
    PENDING_WITHDRAWS.save(deps.storage, &hash, &pending)?;

    let mut response = Response::new();
    if !to_recipient.is_zero() {
        let transfer = token.token_type.custody().release(
            deps.as_ref(),
            &env,
            &token,
            &pending.recipient,
            to_recipient,
        )?;
        response = response.add_submessage(dispatch(deps.storage, transfer)?);
    }

    if let Some(fee_recipient) = &pending.fee_recipient {
        let fee_coins = if !deducted_fee.is_zero() {
            coins(deducted_fee.u128(), &token.token)
        } else {
            coins(caller_fee.u128(), &config.native_denom)
        };
        if !fee_coins[0].amount.is_zero() {
            response = response.add_message(CosmosMsg::Bank(BankMsg::Send {
                to_address: fee_recipient.to_string(),
                amount: fee_coins,
            }));
        }
    }

    Ok(response
        .add_attribute("method", "withdraw_execute")
        .add_attribute("custody", expected.as_str())
        .add_attribute("withdraw_hash", bytes32_to_hex(&hash))
        .add_attribute("recipient", pending.recipient)
        .add_attribute("token", pending.token)
        .add_attribute("amount", to_recipient.to_string())
        .add_attribute("fee", (deducted_fee + caller_fee).to_string()))
}

// ============================================================================
// Helpers
// ============================================================================

pub fn parse_hash(hash: &Binary) -> Result<[u8; 32], ContractError> {
    hash.as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidHash {
            reason: format!("expected 32 bytes, got {}", hash.len()),
        })
}

fn load_pending(storage: &dyn Storage, hash: &[u8; 32]) -> Result<PendingWithdraw, ContractError> {
    PENDING_WITHDRAWS
        .may_load(storage, hash)?
        .ok_or_else(|| ContractError::WithdrawNotFound {
            hash: bytes32_to_hex(hash),
        })
}

fn nonce_key(pending: &PendingWithdraw) -> (&[u8], u64) {
    (pending.src_chain.as_slice(), pending.nonce)
}

/// Only one live approval per (src_chain, nonce); cancelled approvals release it
fn ensure_nonce_unclaimed(
    storage: &dyn Storage,
    pending: &PendingWithdraw,
) -> Result<(), ContractError> {
    if WITHDRAW_NONCE_APPROVED.has(storage, nonce_key(pending)) {
        return Err(ContractError::NonceAlreadyApproved {
            src_chain: bytes4_to_hex(&pending.src_chain),
            nonce: pending.nonce,
        });
    }
    Ok(())
}

fn ensure_window_open(
    storage: &dyn Storage,
    env: &Env,
    pending: &PendingWithdraw,
) -> Result<(), ContractError> {
    let window = CANCEL_WINDOW.load(storage)?;
    if !pending.is_cancel_window_open(window, env.block.time.seconds()) {
        return Err(ContractError::CancelWindowExpired);
    }
    Ok(())
}

/// Load a withdrawal and check it may be executed now
fn load_and_validate_execution(
    storage: &dyn Storage,
    env: &Env,
    hash: &[u8; 32],
) -> Result<PendingWithdraw, ContractError> {
    let pending = load_pending(storage, hash)?;

    if pending.executed {
        return Err(ContractError::WithdrawAlreadyExecuted {
            hash: bytes32_to_hex(hash),
        });
    }
    if !pending.approved {
        return Err(ContractError::WithdrawNotApproved {
            hash: bytes32_to_hex(hash),
        });
    }
    if pending.cancelled {
        return Err(ContractError::WithdrawCancelled {
            hash: bytes32_to_hex(hash),
        });
    }

    let window = CANCEL_WINDOW.load(storage)?;
    if pending.is_cancel_window_open(window, env.block.time.seconds()) {
        return Err(ContractError::CancelWindowActive {
            window_end: pending.cancel_window_end(window),
        });
    }

    Ok(pending)
}

/// Withdraw amount rescaled to local token decimals
fn payout_amount(pending: &PendingWithdraw) -> Result<Uint128, ContractError> {
    let scaled = normalize_decimals(
        pending.amount.u128(),
        pending.src_decimals,
        pending.dest_decimals,
    )?;
    Ok(Uint128::new(scaled))
}

/// Amount of the native denom attached to the message; other denoms are rejected
fn native_funds(config: &Config, info: &MessageInfo) -> Result<Uint128, ContractError> {
    let mut total = Uint128::zero();
    for coin in &info.funds {
        if coin.denom != config.native_denom {
            return Err(ContractError::InvalidFunds {
                reason: format!("unexpected denom {}", coin.denom),
            });
        }
        total = total.checked_add(coin.amount).map_err(cosmwasm_std::StdError::from)?;
    }
    Ok(total)
}
