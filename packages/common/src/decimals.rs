//! Decimal normalization between chains with different token precision.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalsError {
    #[error("Decimal scaling overflow: {amount} from {src_decimals} to {dest_decimals} decimals")]
    Overflow {
        amount: u128,
        src_decimals: u8,
        dest_decimals: u8,
    },
}

/// Rescale `amount` from `src_decimals` to `dest_decimals`.
///
/// Scaling up multiplies and fails on overflow. Scaling down truncates toward
/// zero, so dust below the destination precision is dropped.
pub fn normalize_decimals(
    amount: u128,
    src_decimals: u8,
    dest_decimals: u8,
) -> Result<u128, DecimalsError> {
    let overflow = || DecimalsError::Overflow {
        amount,
        src_decimals,
        dest_decimals,
    };

    if src_decimals == dest_decimals {
        return Ok(amount);
    }

    if dest_decimals > src_decimals {
        let factor = 10u128
            .checked_pow(u32::from(dest_decimals - src_decimals))
            .ok_or_else(overflow)?;
        amount.checked_mul(factor).ok_or_else(overflow)
    } else {
        match 10u128.checked_pow(u32::from(src_decimals - dest_decimals)) {
            Some(factor) => Ok(amount / factor),
            // 10^39 and above exceed any u128 amount
            None => Ok(0),
        }
    }
}
