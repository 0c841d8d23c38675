//! Fee Manager Module
//!
//! Deposit fee calculation with discount-token holder rates and custom
//! per-account fees.
//!
//! ## Fee Structure
//!
//! | Fee Type         | Rate             | Condition                          |
//! |------------------|------------------|------------------------------------|
//! | Standard         | 0.5% (50 bps)    | Default for all users              |
//! | Holder discount  | 0.1% (10 bps)    | Holds ≥ threshold of discount token |
//! | Custom account   | 0-1% (0-100 bps) | Per-account override               |
//!
//! ## Fee Priority (highest to lowest)
//!
//! 1. Custom account fee (if set), even when it is zero
//! 2. Holder discount (if a discount token is configured and the balance qualifies)
//! 3. Standard fee

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Deps, QuerierWrapper, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use crate::error::ContractError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum fee in basis points (1% = 100 bps)
pub const MAX_FEE_BPS: u64 = 100;

pub const DEFAULT_STANDARD_FEE_BPS: u64 = 50;

pub const DEFAULT_DISCOUNTED_FEE_BPS: u64 = 10;

/// Default discount threshold (100 tokens at 6 decimals)
pub const DEFAULT_CL8Y_THRESHOLD: u128 = 100_000_000;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u128 = 10_000;

// ============================================================================
// Data Structures
// ============================================================================

#[cw_serde]
pub struct FeeConfig {
    /// Standard fee in basis points
    pub standard_fee_bps: u64,
    /// Discounted fee in basis points
    pub discounted_fee_bps: u64,
    /// Minimum discount token balance for the discounted rate
    pub cl8y_threshold: Uint128,
    /// Discount token contract (None = discount disabled)
    pub cl8y_token: Option<Addr>,
    /// Address receiving deposit fees
    pub fee_recipient: Addr,
}

impl FeeConfig {
    pub fn default_with_recipient(fee_recipient: Addr) -> Self {
        Self {
            standard_fee_bps: DEFAULT_STANDARD_FEE_BPS,
            discounted_fee_bps: DEFAULT_DISCOUNTED_FEE_BPS,
            cl8y_threshold: Uint128::from(DEFAULT_CL8Y_THRESHOLD),
            cl8y_token: None,
            fee_recipient,
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        validate_fee_bps(self.standard_fee_bps)?;
        validate_fee_bps(self.discounted_fee_bps)?;
        if self.fee_recipient.as_str().is_empty() {
            return Err(ContractError::InvalidFeeRecipient);
        }
        Ok(())
    }
}

/// Per-account override. `is_set` distinguishes an explicit 0 bps from no override.
#[cw_serde]
#[derive(Default)]
pub struct CustomAccountFee {
    pub fee_bps: u64,
    pub is_set: bool,
}

#[cw_serde]
pub enum FeeType {
    Standard,
    Discounted,
    Custom,
}

impl FeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeType::Standard => "standard",
            FeeType::Discounted => "discounted",
            FeeType::Custom => "custom",
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

pub const FEE_CONFIG: Item<FeeConfig> = Item::new("fee_config");

pub const CUSTOM_ACCOUNT_FEES: Map<&Addr, CustomAccountFee> = Map::new("custom_account_fees");

// ============================================================================
// Fee Calculation
// ============================================================================

/// Resolve the rate for an account.
///
/// `discount_balance` is only called when no custom fee is set and a
/// discount token is configured.
pub fn effective_fee_bps<F>(
    config: &FeeConfig,
    custom: &CustomAccountFee,
    discount_balance: F,
) -> StdResult<(u64, FeeType)>
where
    F: FnOnce(&Addr) -> StdResult<Uint128>,
{
    if custom.is_set {
        return Ok((custom.fee_bps, FeeType::Custom));
    }

    if let Some(token) = &config.cl8y_token {
        if discount_balance(token)? >= config.cl8y_threshold {
            return Ok((config.discounted_fee_bps, FeeType::Discounted));
        }
    }

    Ok((config.standard_fee_bps, FeeType::Standard))
}

pub fn get_effective_fee_bps(
    deps: Deps,
    config: &FeeConfig,
    account: &Addr,
) -> StdResult<(u64, FeeType)> {
    let custom = get_custom_account_fee(deps.storage, account)?;
    effective_fee_bps(config, &custom, |token| {
        query_cw20_balance(&deps.querier, token, account)
    })
}

/// `floor(amount * bps / 10000)` with a widening intermediate product
pub fn calculate_fee_from_bps(amount: Uint128, fee_bps: u64) -> Uint128 {
    amount.multiply_ratio(fee_bps as u128, BPS_DENOMINATOR)
}

pub fn calculate_net_amount(amount: Uint128, fee_bps: u64) -> Uint128 {
    amount - calculate_fee_from_bps(amount, fee_bps)
}

fn query_cw20_balance(
    querier: &QuerierWrapper,
    token: &Addr,
    account: &Addr,
) -> StdResult<Uint128> {
    let response: cw20::BalanceResponse = querier.query_wasm_smart(
        token,
        &cw20::Cw20QueryMsg::Balance {
            address: account.to_string(),
        },
    )?;
    Ok(response.balance)
}

// ============================================================================
// Custom Account Fees
// ============================================================================

pub fn validate_fee_bps(fee_bps: u64) -> Result<(), ContractError> {
    if fee_bps > MAX_FEE_BPS {
        return Err(ContractError::FeeExceedsMax {
            given: fee_bps,
            max: MAX_FEE_BPS,
        });
    }
    Ok(())
}

pub fn get_custom_account_fee(
    storage: &dyn Storage,
    account: &Addr,
) -> StdResult<CustomAccountFee> {
    Ok(CUSTOM_ACCOUNT_FEES
        .may_load(storage, account)?
        .unwrap_or_default())
}

pub fn set_custom_account_fee(
    storage: &mut dyn Storage,
    account: &Addr,
    fee_bps: u64,
) -> Result<(), ContractError> {
    validate_fee_bps(fee_bps)?;
    CUSTOM_ACCOUNT_FEES.save(
        storage,
        account,
        &CustomAccountFee {
            fee_bps,
            is_set: true,
        },
    )?;
    Ok(())
}

pub fn remove_custom_account_fee(storage: &mut dyn Storage, account: &Addr) {
    CUSTOM_ACCOUNT_FEES.remove(storage, account);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::mock_dependencies;
    use cosmwasm_std::StdError;

    fn config_with_discount() -> FeeConfig {
        let mut config = FeeConfig::default_with_recipient(Addr::unchecked("terra1fees"));
        config.cl8y_token = Some(Addr::unchecked("terra1cl8y"));
        config
    }

    #[test]
    fn test_fee_calculation() {
        // 0.5% of 1000 = 5
        assert_eq!(calculate_fee_from_bps(Uint128::new(1000), 50), Uint128::new(5));
        assert_eq!(calculate_fee_from_bps(Uint128::new(1_000_000), 10), Uint128::new(1_000));
        // rounds down
        assert_eq!(calculate_fee_from_bps(Uint128::new(199), 50), Uint128::zero());
        assert_eq!(calculate_fee_from_bps(Uint128::new(1000), 0), Uint128::zero());
    }

    #[test]
    fn test_fee_calculation_does_not_overflow() {
        let fee = calculate_fee_from_bps(Uint128::MAX, MAX_FEE_BPS);
        assert_eq!(fee, Uint128::new(u128::MAX / 100));
    }

    #[test]
    fn test_fee_plus_net_equals_amount() {
        for amount in [0u128, 1, 199, 1000, 123_456_789, u128::MAX] {
            for bps in [0u64, 1, 10, 50, 100] {
                let amount = Uint128::new(amount);
                assert_eq!(
                    calculate_fee_from_bps(amount, bps) + calculate_net_amount(amount, bps),
                    amount
                );
            }
        }
    }

    #[test]
    fn test_custom_fee_takes_priority_even_at_zero() {
        let config = config_with_discount();
        let custom = CustomAccountFee {
            fee_bps: 0,
            is_set: true,
        };
        let result = effective_fee_bps(&config, &custom, |_| -> StdResult<Uint128> {
            panic!("balance must not be queried when a custom fee is set")
        })
        .unwrap();
        assert_eq!(result, (0, FeeType::Custom));
    }

    #[test]
    fn test_discount_applies_at_threshold() {
        let config = config_with_discount();
        let custom = CustomAccountFee::default();
        assert_eq!(
            effective_fee_bps(&config, &custom, |_| Ok(Uint128::new(DEFAULT_CL8Y_THRESHOLD)))
                .unwrap(),
            (DEFAULT_DISCOUNTED_FEE_BPS, FeeType::Discounted)
        );
        assert_eq!(
            effective_fee_bps(&config, &custom, |_| {
                Ok(Uint128::new(DEFAULT_CL8Y_THRESHOLD - 1))
            })
            .unwrap(),
            (DEFAULT_STANDARD_FEE_BPS, FeeType::Standard)
        );
    }

    #[test]
    fn test_no_discount_token_skips_balance_query() {
        let config = FeeConfig::default_with_recipient(Addr::unchecked("terra1fees"));
        let result = effective_fee_bps(&config, &CustomAccountFee::default(), |_| {
            Err(StdError::generic_err("unreachable"))
        })
        .unwrap();
        assert_eq!(result, (DEFAULT_STANDARD_FEE_BPS, FeeType::Standard));
    }

    #[test]
    fn test_config_validation() {
        let mut config = FeeConfig::default_with_recipient(Addr::unchecked("terra1fees"));
        assert!(config.validate().is_ok());

        config.standard_fee_bps = 101;
        assert_eq!(
            config.validate(),
            Err(ContractError::FeeExceedsMax {
                given: 101,
                max: 100
            })
        );

        config.standard_fee_bps = 100;
        config.fee_recipient = Addr::unchecked("");
        assert_eq!(config.validate(), Err(ContractError::InvalidFeeRecipient));
    }

    #[test]
    fn test_custom_fee_storage() {
        let mut deps = mock_dependencies();
        let account = Addr::unchecked("terra1user");

        assert!(!get_custom_account_fee(deps.as_ref().storage, &account)
            .unwrap()
            .is_set);

        set_custom_account_fee(deps.as_mut().storage, &account, 25).unwrap();
        assert_eq!(
            get_custom_account_fee(deps.as_ref().storage, &account).unwrap(),
            CustomAccountFee {
                fee_bps: 25,
                is_set: true
            }
        );

        assert!(matches!(
            set_custom_account_fee(deps.as_mut().storage, &account, 101),
            Err(ContractError::FeeExceedsMax { .. })
        ));

        remove_custom_account_fee(deps.as_mut().storage, &account);
        assert!(!get_custom_account_fee(deps.as_ref().storage, &account)
            .unwrap()
            .is_set);
    }
}
