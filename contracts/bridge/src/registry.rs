//! Chain and token registries
//!
//! Read helpers used by the deposit and withdraw handlers, plus the storage
//! behind the admin registration messages.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage};
use cw_storage_plus::Map;
use xchain_common::hash::bytes4_to_hex;

use crate::custody::{Custody, LockUnlock, MintBurn};
use crate::error::ContractError;

// ============================================================================
// Types
// ============================================================================

#[cw_serde]
pub struct ChainEntry {
    pub chain_id: [u8; 4],
    /// Human readable identifier, e.g. "evm_56" or "terraclassic_columbus-5"
    pub identifier: String,
    pub identifier_hash: [u8; 32],
}

/// How the bridge takes custody of a token on deposit and releases it on withdrawal
#[cw_serde]
pub enum TokenType {
    LockUnlock,
    MintBurn,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::LockUnlock => "lock_unlock",
            TokenType::MintBurn => "mint_burn",
        }
    }

    pub fn custody(&self) -> &'static dyn Custody {
        match self {
            TokenType::LockUnlock => &LockUnlock,
            TokenType::MintBurn => &MintBurn,
        }
    }
}

#[cw_serde]
pub struct TokenEntry {
    /// Native denom or CW20 contract address
    pub token: String,
    pub is_native: bool,
    pub token_type: TokenType,
    pub decimals: u8,
    pub enabled: bool,
}

/// Counterpart of a local token on a remote chain
#[cw_serde]
pub struct TokenDestMapping {
    pub dest_token: [u8; 32],
    pub dest_decimals: u8,
}

// ============================================================================
// Storage
// ============================================================================

pub const CHAINS: Map<&[u8], ChainEntry> = Map::new("chains");

pub const CHAIN_BY_IDENTIFIER: Map<&str, [u8; 4]> = Map::new("chain_by_identifier");

pub const TOKENS: Map<&str, TokenEntry> = Map::new("tokens");

/// (local token, remote chain id) -> mapping
pub const TOKEN_DEST_MAPPINGS: Map<(&str, &[u8]), TokenDestMapping> =
    Map::new("token_dest_mappings");

// ============================================================================
// Chain Registry
// ============================================================================

pub fn is_chain_registered(storage: &dyn Storage, chain_id: &[u8; 4]) -> bool {
    CHAINS.has(storage, chain_id)
}

pub fn revert_if_not_registered(
    storage: &dyn Storage,
    chain_id: &[u8; 4],
) -> Result<(), ContractError> {
    if !is_chain_registered(storage, chain_id) {
        return Err(ContractError::ChainNotRegistered {
            chain_id: bytes4_to_hex(chain_id),
        });
    }
    Ok(())
}

pub fn list_chains(storage: &dyn Storage) -> StdResult<Vec<ChainEntry>> {
    CHAINS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, entry)| entry))
        .collect()
}

// ============================================================================
// Token Registry
// ============================================================================

/// Load an enabled token entry
pub fn load_token(storage: &dyn Storage, token: &str) -> Result<TokenEntry, ContractError> {
    match TOKENS.may_load(storage, token)? {
        Some(entry) if entry.enabled => Ok(entry),
        _ => Err(ContractError::TokenNotRegistered {
            token: token.to_string(),
        }),
    }
}

pub fn get_token_type(storage: &dyn Storage, token: &str) -> Result<TokenType, ContractError> {
    load_token(storage, token).map(|entry| entry.token_type)
}

pub fn get_dest_token_mapping(
    storage: &dyn Storage,
    token: &str,
    chain_id: &[u8; 4],
) -> Result<TokenDestMapping, ContractError> {
    TOKEN_DEST_MAPPINGS
        .may_load(storage, (token, chain_id.as_slice()))?
        .ok_or_else(|| ContractError::DestTokenMappingNotSet {
            token: token.to_string(),
            chain_id: bytes4_to_hex(chain_id),
        })
}

pub fn get_dest_token(
    storage: &dyn Storage,
    token: &str,
    chain_id: &[u8; 4],
) -> Result<[u8; 32], ContractError> {
    get_dest_token_mapping(storage, token, chain_id).map(|mapping| mapping.dest_token)
}

/// Parse a 4-byte chain id from message bytes
pub fn parse_chain_id(bytes: &[u8]) -> Result<[u8; 4], ContractError> {
    let chain_id: [u8; 4] = bytes.try_into().map_err(|_| ContractError::InvalidChainId {
        reason: format!("expected 4 bytes, got {}", bytes.len()),
    })?;
    if chain_id == [0u8; 4] {
        return Err(ContractError::InvalidChainId {
            reason: "chain id must be non-zero".to_string(),
        });
    }
    Ok(chain_id)
}
