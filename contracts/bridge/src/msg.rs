//! Message types for the bridge contract

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Uint128};

use crate::fee_manager::FeeConfig;
use crate::registry::TokenType;
use crate::state::{WithdrawFee, WithdrawStatus};

// ============================================================================
// Instantiate & Migrate
// ============================================================================

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Initial operator addresses
    pub operators: Vec<String>,
    /// Initial canceler addresses
    pub cancelers: Vec<String>,
    /// This chain's predetermined 4-byte chain ID
    pub this_chain_id: Binary,
    /// Native denom for operator tips and caller-paid withdraw fees
    pub native_denom: String,
    /// Address receiving deposit fees
    pub fee_recipient: String,
    /// Standard fee in bps (defaults to 50)
    pub standard_fee_bps: Option<u64>,
    /// Cancel window in seconds (defaults to 300)
    pub cancel_window: Option<u64>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Outgoing Transfers
    // ========================================================================
    /// Deposit the single native coin attached to the message
    DepositNative {
        /// Destination chain (4-byte registered chain ID)
        dest_chain: Binary,
        /// Destination account (32-byte universal address)
        dest_account: Binary,
    },

    /// Lock a CW20 token. The bridge must hold an allowance for `amount`.
    DepositCw20 {
        token: String,
        amount: Uint128,
        dest_chain: Binary,
        dest_account: Binary,
    },

    /// Burn a bridge-mintable CW20 token. The bridge must hold an allowance for `amount`.
    DepositCw20Mintable {
        token: String,
        amount: Uint128,
        dest_chain: Binary,
        dest_account: Binary,
    },

    // ========================================================================
    // Incoming Transfers
    // ========================================================================
    /// Register an incoming transfer. Attached native coins are a tip for the approving operator.
    WithdrawSubmit {
        /// Source chain (4-byte registered chain ID)
        src_chain: Binary,
        /// Depositor on the source chain (32-byte universal address)
        src_account: Binary,
        /// Local token (denom or CW20 address)
        token: String,
        /// Local recipient, also committed to in the hash as the destination account
        recipient: String,
        /// Amount in source chain decimals, as deposited
        amount: Uint128,
        /// Deposit nonce on the source chain
        nonce: u64,
        /// Token decimals on the source chain
        src_decimals: u8,
    },

    /// Operator approval, starting the cancel window
    WithdrawApprove {
        withdraw_hash: Binary,
        fee: Option<WithdrawFee>,
    },

    /// Canceler veto while the cancel window is open
    WithdrawCancel { withdraw_hash: Binary },

    /// Operator reversal of a cancel, restarting the cancel window
    WithdrawUncancel { withdraw_hash: Binary },

    /// Pay out a lock/unlock token once the cancel window has elapsed
    WithdrawExecuteUnlock { withdraw_hash: Binary },

    /// Mint a mint/burn token once the cancel window has elapsed
    WithdrawExecuteMint { withdraw_hash: Binary },

    // ========================================================================
    // Configuration (admin)
    // ========================================================================
    SetCancelWindow { seconds: u64 },

    AddOperator { address: String },

    RemoveOperator { address: String },

    AddCanceler { address: String },

    RemoveCanceler { address: String },

    RegisterChain {
        identifier: String,
        chain_id: Binary,
    },

    UnregisterChain { chain_id: Binary },

    AddToken {
        token: String,
        is_native: bool,
        token_type: TokenType,
        decimals: u8,
    },

    SetTokenEnabled { token: String, enabled: bool },

    SetTokenDestination {
        token: String,
        dest_chain: Binary,
        /// Token on the remote chain (32 bytes)
        dest_token: Binary,
        dest_decimals: u8,
    },

    SetFeeParams {
        standard_fee_bps: Option<u64>,
        discounted_fee_bps: Option<u64>,
        cl8y_threshold: Option<Uint128>,
        cl8y_token: Option<String>,
        fee_recipient: Option<String>,
    },

    SetCustomAccountFee { account: String, fee_bps: u64 },

    RemoveCustomAccountFee { account: String },

    Pause {},

    Unpause {},
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    // ========================================================================
    // Core Queries
    // ========================================================================
    #[returns(ConfigResponse)]
    Config {},

    #[returns(Binary)]
    ThisChainId {},

    #[returns(CancelWindowResponse)]
    CancelWindow {},

    // ========================================================================
    // Deposits
    // ========================================================================
    /// Nonce the next deposit will receive
    #[returns(NonceResponse)]
    NextDepositNonce {},

    /// Nonce of the most recent deposit (None before the first one)
    #[returns(LastNonceResponse)]
    LastDepositNonce {},

    #[returns(Option<DepositResponse>)]
    Deposit { transfer_hash: Binary },

    #[returns(Option<DepositResponse>)]
    DepositByNonce { nonce: u64 },

    // ========================================================================
    // Withdrawals
    // ========================================================================
    #[returns(Option<PendingWithdrawResponse>)]
    PendingWithdraw { withdraw_hash: Binary },

    /// Recompute a transfer hash from its seven fields
    #[returns(Binary)]
    ComputeTransferHash {
        src_chain: Binary,
        dest_chain: Binary,
        src_account: Binary,
        dest_account: Binary,
        token: Binary,
        amount: Uint128,
        nonce: u64,
    },

    // ========================================================================
    // Fees
    // ========================================================================
    #[returns(FeeConfig)]
    FeeConfig {},

    #[returns(AccountFeeResponse)]
    AccountFee { account: String },

    #[returns(CalculateFeeResponse)]
    CalculateFee { depositor: String, amount: Uint128 },

    // ========================================================================
    // Roles & Registries
    // ========================================================================
    #[returns(Vec<Addr>)]
    Operators {},

    #[returns(Vec<Addr>)]
    Cancelers {},

    #[returns(Option<ChainResponse>)]
    Chain { chain_id: Binary },

    #[returns(Vec<ChainResponse>)]
    Chains {},

    #[returns(Option<crate::registry::TokenEntry>)]
    Token { token: String },

    #[returns(Option<TokenDestMappingResponse>)]
    TokenDestMapping { token: String, dest_chain: Binary },

    #[returns(Uint128)]
    LockedBalance { token: String },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub paused: bool,
    pub this_chain_id: Binary,
    pub native_denom: String,
}

#[cw_serde]
pub struct CancelWindowResponse {
    pub cancel_window_seconds: u64,
}

#[cw_serde]
pub struct NonceResponse {
    pub nonce: u64,
}

#[cw_serde]
pub struct LastNonceResponse {
    pub nonce: Option<u64>,
}

#[cw_serde]
pub struct DepositResponse {
    pub transfer_hash: Binary,
    pub nonce: u64,
    pub src_account: Binary,
    pub dest_chain: Binary,
    pub dest_account: Binary,
    pub dest_token: Binary,
    pub token: String,
    pub amount: Uint128,
    pub fee: Uint128,
    pub timestamp: u64,
}

#[cw_serde]
pub struct PendingWithdrawResponse {
    pub withdraw_hash: Binary,
    pub src_chain: Binary,
    pub src_account: Binary,
    pub dest_account: Binary,
    pub token: String,
    pub recipient: Addr,
    pub amount: Uint128,
    pub nonce: u64,
    pub src_decimals: u8,
    pub dest_decimals: u8,
    pub operator_gas: Uint128,
    pub fee: Uint128,
    pub fee_recipient: Option<Addr>,
    pub deduct_from_amount: bool,
    pub submitted_at: u64,
    pub approved_at: u64,
    pub approved: bool,
    pub cancelled: bool,
    pub executed: bool,
    pub status: WithdrawStatus,
    /// approved_at + cancel window (0 if not yet approved)
    pub cancel_window_end: u64,
}

#[cw_serde]
pub struct AccountFeeResponse {
    pub account: Addr,
    pub fee_bps: u64,
    pub fee_type: String,
}

#[cw_serde]
pub struct CalculateFeeResponse {
    pub depositor: Addr,
    pub amount: Uint128,
    pub fee: Uint128,
    pub net_amount: Uint128,
    pub fee_bps: u64,
    pub fee_type: String,
}

#[cw_serde]
pub struct ChainResponse {
    pub chain_id: Binary,
    pub identifier: String,
    pub identifier_hash: Binary,
}

#[cw_serde]
pub struct TokenDestMappingResponse {
    pub token: String,
    pub dest_chain: Binary,
    pub dest_token: Binary,
    pub dest_decimals: u8,
}
