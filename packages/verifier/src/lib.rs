//! Off-chain withdrawal verification
//!
//! Operators and cancelers use this crate to check a pending withdrawal on
//! this chain against the deposit recorded on its source chain before they
//! approve it or let it through the cancel window.
//!
//! # Flow
//!
//! 1. Observe a `withdraw_submit` / `withdraw_approve` on this chain
//! 2. Recompute the transfer hash from the withdrawal's fields
//! 3. Look the hash up on the source chain through a [`DepositSource`]
//! 4. Compare every field; a mismatch or missing deposit is `Invalid`
//! 5. Cancelers turn an `Invalid` verdict into a cancel while the window is open

pub mod config;
pub mod types;
pub mod verifier;

pub use config::VerifierConfig;
pub use types::{DepositRecord, PendingWithdrawal};
pub use verifier::{CancelDecision, DepositSource, VerificationResult, WithdrawVerifier};
