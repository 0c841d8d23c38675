//! Withdrawal verification
//!
//! Checks that a pending withdrawal on this chain corresponds to a deposit
//! on its source chain.
//!
//! A verdict is only `Invalid` when the evidence is conclusive: the hash does
//! not match the withdrawal's fields, the source chain has no deposit under
//! that hash, or the deposit disagrees with the withdrawal. Anything that
//! cannot be checked right now (unknown source chain, source unreachable) is
//! `Pending`, so a misconfigured verifier never cancels valid withdrawals.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use eyre::Result;
use tracing::{debug, error, info, warn};
use xchain_common::hash::{bytes32_to_hex, bytes4_to_hex, HashVersion};
use xchain_common::window::{cancel_window_end, is_cancel_window_open};

use crate::config::VerifierConfig;
use crate::types::{DepositRecord, PendingWithdrawal};

/// Read access to the deposits recorded on one source chain
pub trait DepositSource {
    /// Registered 4-byte chain ID of the source chain
    fn chain_id(&self) -> [u8; 4];

    /// Deposit recorded under `transfer_hash`, if any
    fn deposit(&self, transfer_hash: &[u8; 32]) -> Result<Option<DepositRecord>>;
}

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// Withdrawal matches a source deposit
    Valid,
    /// Withdrawal has no matching source deposit
    Invalid { reason: String },
    /// Cannot verify yet
    Pending,
}

/// What a canceler should do with an approved withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelDecision {
    /// Leave it to execute
    Keep,
    /// Cancel while the window is still open
    Cancel { reason: String },
    /// Invalid, but the window has closed and it is already executable
    WindowClosed { reason: String },
    /// Not approved yet or not verifiable yet; check again later
    Retry,
}

pub struct WithdrawVerifier {
    config: VerifierConfig,
    sources: HashMap<[u8; 4], Box<dyn DepositSource>>,
    unknown_source_chain_count: AtomicU64,
}

impl WithdrawVerifier {
    pub fn new(config: VerifierConfig) -> Self {
        info!(
            this_chain_id = %bytes4_to_hex(&config.this_chain_id),
            cancel_window = config.cancel_window_secs,
            canceler_id = %config.canceler_id,
            "Withdraw verifier initialized"
        );
        Self {
            config,
            sources: HashMap::new(),
            unknown_source_chain_count: AtomicU64::new(0),
        }
    }

    /// Route deposits from `source.chain_id()` to `source`, replacing any previous source
    pub fn register_source(&mut self, source: Box<dyn DepositSource>) {
        let chain_id = source.chain_id();
        debug!(src_chain = %bytes4_to_hex(&chain_id), "Registered deposit source");
        self.sources.insert(chain_id, source);
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Number of withdrawals seen from chains with no registered source
    pub fn unknown_source_chain_count(&self) -> u64 {
        self.unknown_source_chain_count.load(Ordering::Relaxed)
    }

    /// Verify a withdrawal against its source chain
    pub fn verify(&self, withdrawal: &PendingWithdrawal) -> Result<VerificationResult> {
        let hash = bytes32_to_hex(&withdrawal.withdraw_hash);

        if withdrawal.dest_chain != self.config.this_chain_id {
            warn!(
                hash = %hash,
                dest_chain = %bytes4_to_hex(&withdrawal.dest_chain),
                "Withdrawal is not addressed to this chain"
            );
            return Ok(VerificationResult::Invalid {
                reason: format!(
                    "Destination chain mismatch: expected {}, got {}",
                    bytes4_to_hex(&self.config.this_chain_id),
                    bytes4_to_hex(&withdrawal.dest_chain)
                ),
            });
        }

        let computed = withdrawal.computed_hash();
        if computed != withdrawal.withdraw_hash {
            warn!(
                expected = %bytes32_to_hex(&computed),
                got = %hash,
                "Hash does not match withdrawal parameters"
            );
            return Ok(VerificationResult::Invalid {
                reason: format!(
                    "Hash does not match parameters. Expected {}, got {}",
                    bytes32_to_hex(&computed),
                    hash
                ),
            });
        }

        let Some(source) = self.sources.get(&withdrawal.src_chain) else {
            let count = self
                .unknown_source_chain_count
                .fetch_add(1, Ordering::Relaxed)
                + 1;
            error!(
                hash = %hash,
                src_chain = %bytes4_to_hex(&withdrawal.src_chain),
                unknown_chain_count = count,
                "Unknown source chain, returning Pending"
            );
            return Ok(VerificationResult::Pending);
        };

        debug!(
            hash = %hash,
            src_chain = %bytes4_to_hex(&withdrawal.src_chain),
            nonce = withdrawal.nonce,
            "Looking up source deposit"
        );

        let deposit = match source.deposit(&withdrawal.withdraw_hash) {
            Ok(Some(deposit)) => deposit,
            Ok(None) => {
                info!(hash = %hash, "No deposit found on source chain");
                return Ok(VerificationResult::Invalid {
                    reason: "No deposit found with this hash on source chain".to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, hash = %hash, "Failed to query source deposit, will retry");
                return Ok(VerificationResult::Pending);
            }
        };

        if let Some(reason) = mismatch(withdrawal, &deposit) {
            warn!(hash = %hash, reason = %reason, "Deposit does not match withdrawal");
            return Ok(VerificationResult::Invalid { reason });
        }

        info!(
            hash = %hash,
            nonce = withdrawal.nonce,
            amount = withdrawal.amount,
            "Deposit verified on source chain"
        );
        Ok(VerificationResult::Valid)
    }

    /// Decide whether to cancel an approved withdrawal at block time `now`
    pub fn review(&self, withdrawal: &PendingWithdrawal, now: u64) -> Result<CancelDecision> {
        if !withdrawal.is_approved() {
            return Ok(CancelDecision::Retry);
        }

        match self.verify(withdrawal)? {
            VerificationResult::Valid => Ok(CancelDecision::Keep),
            VerificationResult::Pending => Ok(CancelDecision::Retry),
            VerificationResult::Invalid { reason } => {
                let window = self.config.cancel_window_secs;
                if is_cancel_window_open(withdrawal.approved_at, window, now) {
                    Ok(CancelDecision::Cancel { reason })
                } else {
                    error!(
                        hash = %bytes32_to_hex(&withdrawal.withdraw_hash),
                        window_end = cancel_window_end(withdrawal.approved_at, window),
                        now,
                        "Invalid withdrawal found after its cancel window closed"
                    );
                    Ok(CancelDecision::WindowClosed { reason })
                }
            }
        }
    }
}

/// First field where the deposit and the withdrawal disagree
fn mismatch(withdrawal: &PendingWithdrawal, deposit: &DepositRecord) -> Option<String> {
    // Withdrawals are always V2; a V1 id never backs one even if the bytes collide
    if deposit.hash_version != HashVersion::V2Unified {
        return Some(format!(
            "Hash version mismatch: expected {:?}, got {:?}",
            HashVersion::V2Unified,
            deposit.hash_version
        ));
    }
    if deposit.transfer_hash != withdrawal.withdraw_hash {
        return Some(format!(
            "Hash mismatch: expected {}, got {}",
            bytes32_to_hex(&withdrawal.withdraw_hash),
            bytes32_to_hex(&deposit.transfer_hash)
        ));
    }
    if deposit.dest_chain != withdrawal.dest_chain {
        return Some(format!(
            "Destination chain mismatch: expected {}, got {}",
            bytes4_to_hex(&withdrawal.dest_chain),
            bytes4_to_hex(&deposit.dest_chain)
        ));
    }
    if deposit.src_account != withdrawal.src_account {
        return Some("Source account mismatch".to_string());
    }
    if deposit.dest_account != withdrawal.dest_account {
        return Some("Destination account mismatch".to_string());
    }
    if deposit.token != withdrawal.token {
        return Some("Token mismatch".to_string());
    }
    if deposit.amount != withdrawal.amount {
        return Some(format!(
            "Amount mismatch: expected {}, got {}",
            withdrawal.amount, deposit.amount
        ));
    }
    if deposit.nonce != withdrawal.nonce {
        return Some(format!(
            "Nonce mismatch: expected {}, got {}",
            withdrawal.nonce, deposit.nonce
        ));
    }
    None
}
