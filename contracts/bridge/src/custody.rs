//! Asset custody strategies
//!
//! Deposits hand tokens to the bridge through [`Custody::escrow`]; executed
//! withdrawals pay out through [`Custody::release`]. The strategy is chosen
//! per token at registration ([`crate::registry::TokenType::custody`]).
//!
//! Every token movement is dispatched as a sub-message. Balances of the
//! bridge and the counterparty are snapshotted beforehand and re-read in the
//! reply, which rejects any transfer that did not move exactly the expected
//! amount (fee-on-transfer, rebasing or otherwise non-standard tokens).
//!
//! While a transfer is in flight the snapshot doubles as a reentrancy guard:
//! every mutating entry point fails with `CustodyInProgress`.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, CosmosMsg, Deps, DepsMut, Env, QuerierWrapper, Reply,
    Response, StdResult, Storage, SubMsg, SubMsgResult, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};
use cw_storage_plus::Item;

use crate::error::ContractError;
use crate::registry::TokenEntry;
use crate::state::LOCKED_BALANCES;

pub const CUSTODY_REPLY_ID: u64 = 1;

#[cw_serde]
pub enum CustodyAction {
    Lock,
    Unlock,
    Mint,
    Burn,
}

impl CustodyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustodyAction::Lock => "lock",
            CustodyAction::Unlock => "unlock",
            CustodyAction::Mint => "mint",
            CustodyAction::Burn => "burn",
        }
    }
}

/// Balance snapshot taken before a custody transfer
#[cw_serde]
pub struct PendingCustody {
    pub action: CustodyAction,
    pub token: TokenEntry,
    /// Depositor for lock/burn, recipient for unlock/mint
    pub account: Addr,
    pub amount: Uint128,
    pub this_before: Uint128,
    pub account_before: Uint128,
}

pub const PENDING_CUSTODY: Item<PendingCustody> = Item::new("pending_custody");

/// A token movement and the snapshot it must be verified against
pub struct CustodyTransfer {
    pub msg: CosmosMsg,
    pub check: PendingCustody,
}

pub trait Custody {
    /// Move `amount` from `from` into bridge custody.
    ///
    /// Returns `None` when the asset already arrived with the message
    /// (native coins attached to a deposit).
    fn escrow(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        from: &Addr,
        amount: Uint128,
    ) -> Result<Option<CustodyTransfer>, ContractError>;

    /// Move `amount` out of bridge custody to `to`
    fn release(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        to: &Addr,
        amount: Uint128,
    ) -> Result<CustodyTransfer, ContractError>;
}

// ============================================================================
// Strategies
// ============================================================================

/// Tokens are held by the bridge and paid back out of its balance
pub struct LockUnlock;

impl Custody for LockUnlock {
    fn escrow(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        from: &Addr,
        amount: Uint128,
    ) -> Result<Option<CustodyTransfer>, ContractError> {
        if token.is_native {
            return Ok(None);
        }
        let msg = cw20_execute(
            &token.token,
            &Cw20ExecuteMsg::TransferFrom {
                owner: from.to_string(),
                recipient: env.contract.address.to_string(),
                amount,
            },
        )?;
        let check = snapshot(deps, env, CustodyAction::Lock, token, from, amount)?;
        Ok(Some(CustodyTransfer { msg, check }))
    }

    fn release(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        to: &Addr,
        amount: Uint128,
    ) -> Result<CustodyTransfer, ContractError> {
        let msg = if token.is_native {
            CosmosMsg::Bank(BankMsg::Send {
                to_address: to.to_string(),
                amount: coins(amount.u128(), &token.token),
            })
        } else {
            cw20_execute(
                &token.token,
                &Cw20ExecuteMsg::Transfer {
                    recipient: to.to_string(),
                    amount,
                },
            )?
        };
        let check = snapshot(deps, env, CustodyAction::Unlock, token, to, amount)?;
        Ok(CustodyTransfer { msg, check })
    }
}

/// Tokens are burned on deposit and minted on withdrawal; the bridge must be minter
pub struct MintBurn;

impl Custody for MintBurn {
    fn escrow(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        from: &Addr,
        amount: Uint128,
    ) -> Result<Option<CustodyTransfer>, ContractError> {
        ensure_cw20(token)?;
        let msg = cw20_execute(
            &token.token,
            &Cw20ExecuteMsg::BurnFrom {
                owner: from.to_string(),
                amount,
            },
        )?;
        let check = snapshot(deps, env, CustodyAction::Burn, token, from, amount)?;
        Ok(Some(CustodyTransfer { msg, check }))
    }

    fn release(
        &self,
        deps: Deps,
        env: &Env,
        token: &TokenEntry,
        to: &Addr,
        amount: Uint128,
    ) -> Result<CustodyTransfer, ContractError> {
        ensure_cw20(token)?;
        let msg = cw20_execute(
            &token.token,
            &Cw20ExecuteMsg::Mint {
                recipient: to.to_string(),
                amount,
            },
        )?;
        let check = snapshot(deps, env, CustodyAction::Mint, token, to, amount)?;
        Ok(CustodyTransfer { msg, check })
    }
}

fn ensure_cw20(token: &TokenEntry) -> Result<(), ContractError> {
    if token.is_native {
        return Err(ContractError::WrongTokenType {
            token: token.token.clone(),
            expected: "lock_unlock".to_string(),
        });
    }
    Ok(())
}

fn cw20_execute(token: &str, msg: &Cw20ExecuteMsg) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(msg)?,
        funds: vec![],
    }))
}

fn snapshot(
    deps: Deps,
    env: &Env,
    action: CustodyAction,
    token: &TokenEntry,
    account: &Addr,
    amount: Uint128,
) -> StdResult<PendingCustody> {
    Ok(PendingCustody {
        action,
        token: token.clone(),
        account: account.clone(),
        amount,
        this_before: query_token_balance(&deps.querier, token, &env.contract.address)?,
        account_before: query_token_balance(&deps.querier, token, account)?,
    })
}

pub fn query_token_balance(
    querier: &QuerierWrapper,
    token: &TokenEntry,
    account: &Addr,
) -> StdResult<Uint128> {
    if token.is_native {
        return Ok(querier.query_balance(account, &token.token)?.amount);
    }
    let response: BalanceResponse = querier.query_wasm_smart(
        &token.token,
        &Cw20QueryMsg::Balance {
            address: account.to_string(),
        },
    )?;
    Ok(response.balance)
}

// ============================================================================
// Dispatch & Verification
// ============================================================================

pub fn ensure_idle(storage: &dyn Storage) -> Result<(), ContractError> {
    if PENDING_CUSTODY.exists(storage) {
        return Err(ContractError::CustodyInProgress);
    }
    Ok(())
}

/// Record the snapshot and wrap the transfer in a sub-message that reports back
pub fn dispatch(
    storage: &mut dyn Storage,
    transfer: CustodyTransfer,
) -> Result<SubMsg, ContractError> {
    ensure_idle(storage)?;
    PENDING_CUSTODY.save(storage, &transfer.check)?;
    Ok(SubMsg::reply_always(transfer.msg, CUSTODY_REPLY_ID))
}

pub fn handle_custody_reply(
    deps: DepsMut,
    env: Env,
    reply: Reply,
) -> Result<Response, ContractError> {
    if reply.id != CUSTODY_REPLY_ID {
        return Err(ContractError::UnexpectedReply { id: reply.id });
    }
    let pending = PENDING_CUSTODY
        .may_load(deps.storage)?
        .ok_or(ContractError::UnexpectedReply { id: reply.id })?;
    PENDING_CUSTODY.remove(deps.storage);

    if let SubMsgResult::Err(reason) = reply.result {
        return Err(if pending.token.is_native {
            ContractError::NativeTransferFailed { reason }
        } else {
            ContractError::CustodyCallFailed { reason }
        });
    }

    let this_after = query_token_balance(&deps.querier, &pending.token, &env.contract.address)?;
    let account_after = query_token_balance(&deps.querier, &pending.token, &pending.account)?;
    verify_balance_deltas(&pending, this_after, account_after)?;

    Ok(Response::new()
        .add_attribute("method", "custody_verified")
        .add_attribute("custody_action", pending.action.as_str())
        .add_attribute("token", pending.token.token)
        .add_attribute("amount", pending.amount))
}

/// Require the transfer to have moved exactly `amount` on each checked side
pub fn verify_balance_deltas(
    pending: &PendingCustody,
    this_after: Uint128,
    account_after: Uint128,
) -> Result<(), ContractError> {
    let expected = pending.amount;
    let this_gained = this_after.saturating_sub(pending.this_before);
    let this_lost = pending.this_before.saturating_sub(this_after);
    let account_gained = account_after.saturating_sub(pending.account_before);
    let account_lost = pending.account_before.saturating_sub(account_after);

    match pending.action {
        CustodyAction::Lock => {
            if this_gained != expected {
                return Err(ContractError::InvalidLockThis {
                    expected,
                    actual: this_gained,
                });
            }
            if account_lost != expected {
                return Err(ContractError::InvalidLockFrom {
                    expected,
                    actual: account_lost,
                });
            }
        }
        CustodyAction::Unlock => {
            if account_gained != expected {
                return Err(ContractError::InvalidUnlockTo {
                    expected,
                    actual: account_gained,
                });
            }
            if this_lost != expected {
                return Err(ContractError::InvalidUnlockThis {
                    expected,
                    actual: this_lost,
                });
            }
        }
        CustodyAction::Mint => {
            if account_gained != expected {
                return Err(ContractError::InvalidMintTo {
                    expected,
                    actual: account_gained,
                });
            }
        }
        CustodyAction::Burn => {
            if account_lost != expected {
                return Err(ContractError::InvalidBurnFrom {
                    expected,
                    actual: account_lost,
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Locked Liquidity
// ============================================================================

pub fn increase_locked(
    storage: &mut dyn Storage,
    token: &str,
    amount: Uint128,
) -> StdResult<Uint128> {
    LOCKED_BALANCES.update(storage, token, |locked| -> StdResult<_> {
        Ok(locked.unwrap_or_default().checked_add(amount)?)
    })
}

pub fn decrease_locked(
    storage: &mut dyn Storage,
    token: &str,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let available = LOCKED_BALANCES
        .may_load(storage, token)?
        .unwrap_or_default();
    let remaining = available
        .checked_sub(amount)
        .map_err(|_| ContractError::InsufficientLiquidity {
            token: token.to_string(),
            available,
            requested: amount,
        })?;
    LOCKED_BALANCES.save(storage, token, &remaining)?;
    Ok(remaining)
}
