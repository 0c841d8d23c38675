//! Operator and canceler role sets
//!
//! Members are kept in insertion order so listings are stable across
//! removals. Admin is held in [`crate::state::Config`].

use cosmwasm_std::{Addr, Order, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;
use crate::state::CONFIG;

pub struct RoleSet<'a> {
    name: &'a str,
    /// member -> insertion index
    members: Map<'a, &'a Addr, u64>,
    /// insertion index -> member
    order: Map<'a, u64, Addr>,
    next_index: Item<'a, u64>,
}

impl<'a> RoleSet<'a> {
    pub const fn new(
        name: &'a str,
        members_ns: &'a str,
        order_ns: &'a str,
        next_index_ns: &'a str,
    ) -> Self {
        Self {
            name,
            members: Map::new(members_ns),
            order: Map::new(order_ns),
            next_index: Item::new(next_index_ns),
        }
    }

    pub fn contains(&self, storage: &dyn Storage, addr: &'a Addr) -> bool {
        self.members.has(storage, addr)
    }

    pub fn add(&self, storage: &mut dyn Storage, addr: &'a Addr) -> Result<(), ContractError> {
        if self.contains(storage, addr) {
            return Err(ContractError::RoleAlreadyGranted {
                role: self.name.to_string(),
                address: addr.to_string(),
            });
        }
        let index = self.next_index.may_load(storage)?.unwrap_or_default();
        self.members.save(storage, addr, &index)?;
        self.order.save(storage, index, addr)?;
        self.next_index.save(storage, &(index + 1))?;
        Ok(())
    }

    pub fn remove(&self, storage: &mut dyn Storage, addr: &'a Addr) -> Result<(), ContractError> {
        let index = self
            .members
            .may_load(storage, addr)?
            .ok_or_else(|| ContractError::RoleNotGranted {
                role: self.name.to_string(),
                address: addr.to_string(),
            })?;
        self.members.remove(storage, addr);
        self.order.remove(storage, index);
        Ok(())
    }

    /// Members in the order they were granted the role
    pub fn list(&self, storage: &dyn Storage) -> StdResult<Vec<Addr>> {
        self.order
            .range(storage, None, None, Order::Ascending)
            .map(|item| item.map(|(_, addr)| addr))
            .collect()
    }
}

pub const OPERATORS: RoleSet = RoleSet::new(
    "operator",
    "operators",
    "operators_order",
    "operators_next",
);

pub const CANCELERS: RoleSet = RoleSet::new(
    "canceler",
    "cancelers",
    "cancelers_order",
    "cancelers_next",
);

// ============================================================================
// Guards
// ============================================================================

pub fn ensure_admin(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;
    if *sender != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn ensure_operator(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    if !OPERATORS.contains(storage, sender) {
        return Err(ContractError::UnauthorizedOperator);
    }
    Ok(())
}

pub fn ensure_canceler(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    if !CANCELERS.contains(storage, sender) {
        return Err(ContractError::NotCanceler);
    }
    Ok(())
}
