//! Cross-Chain Bridge Contract
//!
//! Moves fungible tokens between chains that each run an instance of the
//! bridge. Both sides identify a transfer by the same 32-byte transfer hash,
//! computed from the transfer's seven fields.
//!
//! # Outgoing Flow (Deposit)
//! 1. User deposits native coins or CW20 tokens (locked or burned)
//! 2. The deposit fee goes to the fee recipient, the net amount is recorded
//!    under its transfer hash with the next nonce
//! 3. Operators observe the deposit and submit it on the destination chain
//!
//! # Incoming Flow (Approve, Cancel Window, Execute)
//! 1. Anyone calls `WithdrawSubmit` with the source deposit's fields
//! 2. An operator verifies the source deposit and calls `WithdrawApprove`
//! 3. During the cancel window a canceler may `WithdrawCancel`; an operator
//!    may reverse that with `WithdrawUncancel`, which restarts the window
//! 4. After the window anyone calls `WithdrawExecuteUnlock` / `WithdrawExecuteMint`
//!
//! # Security
//! - Every custody transfer is verified against balance snapshots in the reply
//! - No entry point runs while a custody transfer is pending verification
//! - One approval per (source chain, nonce)
//! - Emergency pause

pub mod contract;
pub mod custody;
pub mod error;
mod execute;
pub mod fee_manager;
pub mod msg;
mod query;
pub mod registry;
pub mod roles;
pub mod state;

pub use crate::error::ContractError;
pub use crate::fee_manager::FeeConfig;
pub use crate::registry::TokenType;
pub use xchain_common::{compute_transfer_hash, keccak256, UniversalAddress};
