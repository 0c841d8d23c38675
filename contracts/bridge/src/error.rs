//! Error types for the bridge contract

use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;
use xchain_common::{CodecError, DecimalsError};

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("{0}")]
    Decimals(#[from] DecimalsError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only operator can perform this action")]
    UnauthorizedOperator,

    #[error("Unauthorized: caller is not a canceler")]
    NotCanceler,

    #[error("{role} already granted to {address}")]
    RoleAlreadyGranted { role: String, address: String },

    #[error("{role} not granted to {address}")]
    RoleNotGranted { role: String, address: String },

    // ========================================================================
    // Bridge State Errors
    // ========================================================================

    #[error("Bridge is paused")]
    BridgePaused,

    #[error("Invalid chain ID: {reason}")]
    InvalidChainId { reason: String },

    #[error("Chain not registered: {chain_id}")]
    ChainNotRegistered { chain_id: String },

    #[error("Chain already registered: {identifier}")]
    ChainAlreadyRegistered { identifier: String },

    #[error("Token not registered: {token}")]
    TokenNotRegistered { token: String },

    #[error("Token already registered: {token}")]
    TokenAlreadyRegistered { token: String },

    #[error("No destination mapping for token {token} on chain {chain_id}")]
    DestTokenMappingNotSet { token: String, chain_id: String },

    #[error("Wrong token type for {token}: expected {expected}")]
    WrongTokenType { token: String, expected: String },

    // ========================================================================
    // Amount, Address & Funds Errors
    // ========================================================================

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: Uint128 },

    #[error("Invalid destination account")]
    InvalidDestAccount,

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    #[error("Invalid funds: {reason}")]
    InvalidFunds { reason: String },

    #[error("Decimals mismatch: expected {expected}, got {got}")]
    DecimalsMismatch { expected: u8, got: u8 },

    // ========================================================================
    // Fee Errors
    // ========================================================================

    #[error("Fee {given} bps exceeds max {max} bps")]
    FeeExceedsMax { given: u64, max: u64 },

    #[error("Invalid fee recipient")]
    InvalidFeeRecipient,

    #[error("Fee {fee} exceeds withdraw amount {amount}")]
    FeeExceedsAmount { fee: Uint128, amount: Uint128 },

    #[error("Fee deduction is only allowed for native token withdrawals")]
    ApprovalNotNativePath,

    #[error("Native token withdrawals must deduct the fee from the amount")]
    ApprovalRequiresNativePath,

    #[error("Insufficient native value: required {required}, sent {sent}")]
    InsufficientNativeValue { required: Uint128, sent: Uint128 },

    // ========================================================================
    // Withdraw Lifecycle Errors
    // ========================================================================

    #[error("Withdraw not found: {hash}")]
    WithdrawNotFound { hash: String },

    #[error("Withdraw already submitted: {hash}")]
    WithdrawAlreadySubmitted { hash: String },

    #[error("Withdraw already approved: {hash}")]
    WithdrawAlreadyApproved { hash: String },

    #[error("Withdraw not approved: {hash}")]
    WithdrawNotApproved { hash: String },

    #[error("Withdraw cancelled: {hash}")]
    WithdrawCancelled { hash: String },

    #[error("Withdraw not cancelled: {hash}")]
    WithdrawNotCancelled { hash: String },

    #[error("Withdraw already executed: {hash}")]
    WithdrawAlreadyExecuted { hash: String },

    #[error("Nonce {nonce} already approved for source chain {src_chain}")]
    NonceAlreadyApproved { src_chain: String, nonce: u64 },

    #[error("Cancel window expired")]
    CancelWindowExpired,

    #[error("Cancel window active until {window_end}")]
    CancelWindowActive { window_end: u64 },

    #[error("Cancel window {given}s out of bounds [{min}, {max}]")]
    CancelWindowOutOfBounds { given: u64, min: u64, max: u64 },

    // ========================================================================
    // Custody Errors
    // ========================================================================

    #[error("Bridge received {actual} instead of {expected} on lock")]
    InvalidLockThis { expected: Uint128, actual: Uint128 },

    #[error("Depositor sent {actual} instead of {expected} on lock")]
    InvalidLockFrom { expected: Uint128, actual: Uint128 },

    #[error("Recipient received {actual} instead of {expected} on unlock")]
    InvalidUnlockTo { expected: Uint128, actual: Uint128 },

    #[error("Bridge released {actual} instead of {expected} on unlock")]
    InvalidUnlockThis { expected: Uint128, actual: Uint128 },

    #[error("Recipient received {actual} instead of {expected} on mint")]
    InvalidMintTo { expected: Uint128, actual: Uint128 },

    #[error("Depositor burned {actual} instead of {expected}")]
    InvalidBurnFrom { expected: Uint128, actual: Uint128 },

    #[error("Native transfer failed: {reason}")]
    NativeTransferFailed { reason: String },

    #[error("Token call failed: {reason}")]
    CustodyCallFailed { reason: String },

    #[error("Custody transfer in progress")]
    CustodyInProgress,

    #[error("Unexpected reply id: {id}")]
    UnexpectedReply { id: u64 },

    #[error("Insufficient liquidity for {token}: available {available}, requested {requested}")]
    InsufficientLiquidity {
        token: String,
        available: Uint128,
        requested: Uint128,
    },
}
