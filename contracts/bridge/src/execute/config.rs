//! Configuration management handlers.
//!
//! This module handles:
//! - Operator and canceler management
//! - Cancel window configuration
//! - Chain registration
//! - Token registration and destination mappings
//! - Deposit fee parameters and custom account fees
//!
//! Every handler here is admin only.

use cosmwasm_std::{Binary, DepsMut, MessageInfo, Response, Uint128};
use xchain_common::hash::{bytes32_to_hex, bytes4_to_hex};
use xchain_common::keccak256;
use xchain_common::window::{is_valid_cancel_window, MAX_CANCEL_WINDOW, MIN_CANCEL_WINDOW};

use crate::error::ContractError;
use crate::fee_manager::{remove_custom_account_fee, set_custom_account_fee, FEE_CONFIG};
use crate::registry::{
    parse_chain_id, revert_if_not_registered, ChainEntry, TokenDestMapping, TokenEntry, TokenType,
    CHAINS, CHAIN_BY_IDENTIFIER, TOKENS, TOKEN_DEST_MAPPINGS,
};
use crate::roles::{ensure_admin, CANCELERS, OPERATORS};
use crate::state::CANCEL_WINDOW;

// ============================================================================
// Role Management
// ============================================================================

pub fn execute_add_operator(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let operator = deps.api.addr_validate(&address)?;
    OPERATORS.add(deps.storage, &operator)?;

    Ok(Response::new()
        .add_attribute("method", "add_operator")
        .add_attribute("operator", operator))
}

pub fn execute_remove_operator(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let operator = deps.api.addr_validate(&address)?;
    OPERATORS.remove(deps.storage, &operator)?;

    Ok(Response::new()
        .add_attribute("method", "remove_operator")
        .add_attribute("operator", operator))
}

pub fn execute_add_canceler(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let canceler = deps.api.addr_validate(&address)?;
    CANCELERS.add(deps.storage, &canceler)?;

    Ok(Response::new()
        .add_attribute("method", "add_canceler")
        .add_attribute("canceler", canceler))
}

pub fn execute_remove_canceler(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let canceler = deps.api.addr_validate(&address)?;
    CANCELERS.remove(deps.storage, &canceler)?;

    Ok(Response::new()
        .add_attribute("method", "remove_canceler")
        .add_attribute("canceler", canceler))
}

// ============================================================================
// Cancel Window
// ============================================================================

/// Applies to every withdrawal, including ones already approved
pub fn execute_set_cancel_window(
    deps: DepsMut,
    info: MessageInfo,
    seconds: u64,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    if !is_valid_cancel_window(seconds) {
        return Err(ContractError::CancelWindowOutOfBounds {
            given: seconds,
            min: MIN_CANCEL_WINDOW,
            max: MAX_CANCEL_WINDOW,
        });
    }
    CANCEL_WINDOW.save(deps.storage, &seconds)?;

    Ok(Response::new()
        .add_attribute("method", "set_cancel_window")
        .add_attribute("cancel_window_seconds", seconds.to_string()))
}

// ============================================================================
// Chain Registry
// ============================================================================

pub fn execute_register_chain(
    deps: DepsMut,
    info: MessageInfo,
    identifier: String,
    chain_id: Binary,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    if identifier.is_empty() {
        return Err(ContractError::InvalidChainId {
            reason: "identifier must not be empty".to_string(),
        });
    }
    let chain_id = parse_chain_id(chain_id.as_slice())?;

    if CHAIN_BY_IDENTIFIER.has(deps.storage, &identifier) || CHAINS.has(deps.storage, &chain_id) {
        return Err(ContractError::ChainAlreadyRegistered { identifier });
    }

    let entry = ChainEntry {
        chain_id,
        identifier: identifier.clone(),
        identifier_hash: keccak256(identifier.as_bytes()),
    };
    CHAINS.save(deps.storage, &chain_id, &entry)?;
    CHAIN_BY_IDENTIFIER.save(deps.storage, &identifier, &chain_id)?;

    Ok(Response::new()
        .add_attribute("method", "register_chain")
        .add_attribute("identifier", identifier)
        .add_attribute("chain_id", bytes4_to_hex(&chain_id))
        .add_attribute("identifier_hash", bytes32_to_hex(&entry.identifier_hash)))
}

pub fn execute_unregister_chain(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: Binary,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let chain_id = parse_chain_id(chain_id.as_slice())?;
    revert_if_not_registered(deps.storage, &chain_id)?;

    let entry = CHAINS.load(deps.storage, &chain_id)?;
    CHAINS.remove(deps.storage, &chain_id);
    CHAIN_BY_IDENTIFIER.remove(deps.storage, &entry.identifier);

    Ok(Response::new()
        .add_attribute("method", "unregister_chain")
        .add_attribute("identifier", entry.identifier)
        .add_attribute("chain_id", bytes4_to_hex(&chain_id)))
}

// ============================================================================
// Token Registry
// ============================================================================

pub fn execute_add_token(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    is_native: bool,
    token_type: TokenType,
    decimals: u8,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    if TOKENS.has(deps.storage, &token) {
        return Err(ContractError::TokenAlreadyRegistered { token });
    }
    if is_native && token_type != TokenType::LockUnlock {
        return Err(ContractError::WrongTokenType {
            token,
            expected: TokenType::LockUnlock.as_str().to_string(),
        });
    }
    if !is_native {
        deps.api.addr_validate(&token)?;
    }

    let entry = TokenEntry {
        token: token.clone(),
        is_native,
        token_type,
        decimals,
        enabled: true,
    };
    TOKENS.save(deps.storage, &token, &entry)?;

    Ok(Response::new()
        .add_attribute("method", "add_token")
        .add_attribute("token", token)
        .add_attribute("token_type", entry.token_type.as_str())
        .add_attribute("decimals", decimals.to_string()))
}

pub fn execute_set_token_enabled(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    enabled: bool,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    TOKENS.update(deps.storage, &token, |entry| match entry {
        Some(mut entry) => {
            entry.enabled = enabled;
            Ok(entry)
        }
        None => Err(ContractError::TokenNotRegistered {
            token: token.clone(),
        }),
    })?;

    Ok(Response::new()
        .add_attribute("method", "set_token_enabled")
        .add_attribute("token", token)
        .add_attribute("enabled", enabled.to_string()))
}

pub fn execute_set_token_destination(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    dest_chain: Binary,
    dest_token: Binary,
    dest_decimals: u8,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    if !TOKENS.has(deps.storage, &token) {
        return Err(ContractError::TokenNotRegistered { token });
    }
    let dest_chain = parse_chain_id(dest_chain.as_slice())?;
    revert_if_not_registered(deps.storage, &dest_chain)?;
    let dest_token: [u8; 32] =
        dest_token
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::InvalidAddress {
                reason: format!("dest_token must be 32 bytes, got {}", dest_token.len()),
            })?;

    TOKEN_DEST_MAPPINGS.save(
        deps.storage,
        (token.as_str(), dest_chain.as_slice()),
        &TokenDestMapping {
            dest_token,
            dest_decimals,
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "set_token_destination")
        .add_attribute("token", token)
        .add_attribute("dest_chain", bytes4_to_hex(&dest_chain))
        .add_attribute("dest_token", bytes32_to_hex(&dest_token))
        .add_attribute("dest_decimals", dest_decimals.to_string()))
}

// ============================================================================
// Fees
// ============================================================================

pub fn execute_set_fee_params(
    deps: DepsMut,
    info: MessageInfo,
    standard_fee_bps: Option<u64>,
    discounted_fee_bps: Option<u64>,
    cl8y_threshold: Option<Uint128>,
    cl8y_token: Option<String>,
    fee_recipient: Option<String>,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let mut config = FEE_CONFIG.load(deps.storage)?;
    if let Some(bps) = standard_fee_bps {
        config.standard_fee_bps = bps;
    }
    if let Some(bps) = discounted_fee_bps {
        config.discounted_fee_bps = bps;
    }
    if let Some(threshold) = cl8y_threshold {
        config.cl8y_threshold = threshold;
    }
    if let Some(token) = cl8y_token {
        config.cl8y_token = Some(deps.api.addr_validate(&token)?);
    }
    if let Some(recipient) = fee_recipient {
        config.fee_recipient = deps.api.addr_validate(&recipient)?;
    }
    config.validate()?;
    FEE_CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "set_fee_params")
        .add_attribute("standard_fee_bps", config.standard_fee_bps.to_string())
        .add_attribute("discounted_fee_bps", config.discounted_fee_bps.to_string())
        .add_attribute("cl8y_threshold", config.cl8y_threshold.to_string())
        .add_attribute("fee_recipient", config.fee_recipient))
}

pub fn execute_set_custom_account_fee(
    deps: DepsMut,
    info: MessageInfo,
    account: String,
    fee_bps: u64,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let account = deps.api.addr_validate(&account)?;
    set_custom_account_fee(deps.storage, &account, fee_bps)?;

    Ok(Response::new()
        .add_attribute("method", "set_custom_account_fee")
        .add_attribute("account", account)
        .add_attribute("fee_bps", fee_bps.to_string()))
}

pub fn execute_remove_custom_account_fee(
    deps: DepsMut,
    info: MessageInfo,
    account: String,
) -> Result<Response, ContractError> {
    ensure_admin(deps.storage, &info.sender)?;

    let account = deps.api.addr_validate(&account)?;
    remove_custom_account_fee(deps.storage, &account);

    Ok(Response::new()
        .add_attribute("method", "remove_custom_account_fee")
        .add_attribute("account", account))
}
