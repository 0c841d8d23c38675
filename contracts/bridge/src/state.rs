//! State definitions for the bridge contract
//!
//! Deposit records are append-only. Pending withdrawals are never removed;
//! their lifecycle is tracked through the `approved`, `cancelled` and
//! `executed` flags.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use xchain_common::window::{cancel_window_end, is_cancel_window_open};

// ============================================================================
// Core Configuration
// ============================================================================

#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Whether the bridge is currently paused
    pub paused: bool,
    /// This chain's 4-byte id, used as src chain on deposits and dest chain on withdrawals
    pub this_chain_id: [u8; 4],
    /// Native denom used for operator tips and caller-paid withdraw fees
    pub native_denom: String,
}

// ============================================================================
// Outgoing Transfers
// ============================================================================

/// Immutable record of an outgoing transfer, keyed by its transfer hash
#[cw_serde]
pub struct DepositRecord {
    /// Nonce assigned to this deposit
    pub nonce: u64,
    /// Depositor as a universal address
    pub src_account: [u8; 32],
    /// Destination chain id
    pub dest_chain: [u8; 4],
    /// Recipient on the destination chain
    pub dest_account: [u8; 32],
    /// Token encoding on the destination chain
    pub dest_token: [u8; 32],
    /// Local token identifier (denom or CW20 address)
    pub token: String,
    /// Amount after fees, the value committed to in the hash
    pub amount: Uint128,
    /// Fee paid to the fee recipient
    pub fee: Uint128,
    /// Block time of the deposit in seconds
    pub timestamp: u64,
}

// ============================================================================
// Incoming Transfers
// ============================================================================

/// Fee attached to a withdrawal at approval time
#[cw_serde]
pub struct WithdrawFee {
    pub amount: Uint128,
    pub recipient: String,
    /// Take the fee out of the payout (native tokens only)
    pub deduct_from_amount: bool,
}

/// Lifecycle state of an incoming transfer
#[cw_serde]
pub struct PendingWithdraw {
    pub src_chain: [u8; 4],
    pub src_account: [u8; 32],
    pub dest_account: [u8; 32],
    /// Local token identifier
    pub token: String,
    pub recipient: Addr,
    /// Amount in source chain decimals, the value committed to in the hash
    pub amount: Uint128,
    pub nonce: u64,
    pub src_decimals: u8,
    pub dest_decimals: u8,
    /// Native tip attached at submission, paid to the approving operator
    pub operator_gas: Uint128,
    pub fee: Uint128,
    pub fee_recipient: Option<Addr>,
    pub deduct_from_amount: bool,
    pub submitted_at: u64,
    pub approved_at: u64,
    pub approved: bool,
    pub cancelled: bool,
    pub executed: bool,
}

#[cw_serde]
pub enum WithdrawStatus {
    Submitted,
    /// Approved and still inside the cancel window
    Approved,
    Executable,
    Cancelled,
    Executed,
}

impl WithdrawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawStatus::Submitted => "submitted",
            WithdrawStatus::Approved => "approved",
            WithdrawStatus::Executable => "executable",
            WithdrawStatus::Cancelled => "cancelled",
            WithdrawStatus::Executed => "executed",
        }
    }
}

impl PendingWithdraw {
    pub fn cancel_window_end(&self, window: u64) -> u64 {
        cancel_window_end(self.approved_at, window)
    }

    pub fn is_cancel_window_open(&self, window: u64, now: u64) -> bool {
        is_cancel_window_open(self.approved_at, window, now)
    }

    pub fn status(&self, window: u64, now: u64) -> WithdrawStatus {
        if self.executed {
            WithdrawStatus::Executed
        } else if self.cancelled {
            WithdrawStatus::Cancelled
        } else if !self.approved {
            WithdrawStatus::Submitted
        } else if self.is_cancel_window_open(window, now) {
            WithdrawStatus::Approved
        } else {
            WithdrawStatus::Executable
        }
    }
}

// ============================================================================
// Constants
// ============================================================================

pub const CONTRACT_NAME: &str = "crates.io:xchain-bridge";

pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// First nonce handed out by a fresh deployment
pub const INITIAL_DEPOSIT_NONCE: u64 = 1;

// ============================================================================
// Storage
// ============================================================================

pub const CONFIG: Item<Config> = Item::new("config");

/// Seconds between approval and executability
pub const CANCEL_WINDOW: Item<u64> = Item::new("cancel_window");

/// Next nonce to assign to a deposit
pub const DEPOSIT_NONCE: Item<u64> = Item::new("deposit_nonce");

/// Deposits by transfer hash
pub const DEPOSITS: Map<&[u8], DepositRecord> = Map::new("deposits");

/// Transfer hash by deposit nonce
pub const DEPOSIT_BY_NONCE: Map<u64, [u8; 32]> = Map::new("deposit_by_nonce");

/// Incoming transfers by transfer hash
pub const PENDING_WITHDRAWS: Map<&[u8], PendingWithdraw> = Map::new("pending_withdraws");

/// (src_chain, nonce) pairs held by an approved, uncancelled withdrawal
pub const WITHDRAW_NONCE_APPROVED: Map<(&[u8], u64), bool> = Map::new("withdraw_nonce_approved");

/// Amount of each lock/unlock token held on behalf of bridged users
pub const LOCKED_BALANCES: Map<&str, Uint128> = Map::new("locked_balances");
