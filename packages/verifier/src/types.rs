//! Observations fed to the verifier

use xchain_common::hash::HashVersion;
use xchain_common::compute_transfer_hash;

/// A withdrawal as observed on this (destination) chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWithdrawal {
    pub withdraw_hash: [u8; 32],
    pub src_chain: [u8; 4],
    pub dest_chain: [u8; 4],
    pub src_account: [u8; 32],
    pub dest_account: [u8; 32],
    /// Token as committed to in the hash (destination encoding)
    pub token: [u8; 32],
    /// Amount in source chain decimals
    pub amount: u128,
    pub nonce: u64,
    /// Block time of the approval, 0 if not yet approved
    pub approved_at: u64,
}

impl PendingWithdrawal {
    pub fn computed_hash(&self) -> [u8; 32] {
        compute_transfer_hash(
            &self.src_chain,
            &self.dest_chain,
            &self.src_account,
            &self.dest_account,
            &self.token,
            self.amount,
            self.nonce,
        )
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at != 0
    }
}

/// A deposit as recorded on its source chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRecord {
    pub transfer_hash: [u8; 32],
    pub dest_chain: [u8; 4],
    pub src_account: [u8; 32],
    pub dest_account: [u8; 32],
    pub token: [u8; 32],
    /// Net amount after the deposit fee
    pub amount: u128,
    pub nonce: u64,
    pub timestamp: u64,
    /// Format the source chain recorded `transfer_hash` under
    pub hash_version: HashVersion,
}
