//! Execute handlers for the bridge contract.
//!
//! This module contains all execute message handlers, organized by category:
//! - `deposit` - outgoing transfers (native, CW20 lock, CW20 burn)
//! - `withdraw` - submit, approve, cancel, uncancel and execute of incoming transfers
//! - `config` - roles, registries, fee parameters and the cancel window
//! - `admin` - pause and unpause

mod admin;
mod config;
mod deposit;
mod withdraw;

pub use admin::*;
pub use config::*;
pub use deposit::*;
pub use withdraw::*;

use cosmwasm_std::Addr;
use xchain_common::UniversalAddress;

use crate::error::ContractError;

/// Encode a local account as the 32-byte universal address committed to in transfer hashes
pub fn encode_local_account(addr: &Addr) -> Result<[u8; 32], ContractError> {
    let universal =
        UniversalAddress::from_cosmos(addr.as_str()).map_err(|e| ContractError::InvalidAddress {
            reason: e.to_string(),
        })?;
    Ok(universal.to_bytes32())
}
