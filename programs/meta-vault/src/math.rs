//! Fixed-point helpers shared by every ratio computation in the vault.

use anchor_lang::prelude::*;

use crate::errors::VaultError;

use self::wide::U256;

// Kept out of the prelude's scope: the macro expands `Result` unqualified
mod wide {
    uint::construct_uint! {
        pub struct U256(4);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// `x * y / denominator` with a 256-bit intermediate.
///
/// Fails with `DivisionByZero` for a zero denominator and `MathOverflow` when
/// the rounded quotient does not fit in a `u128`.
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    require!(denominator != 0, VaultError::DivisionByZero);

    let numerator = U256::from(x)
        .checked_mul(U256::from(y))
        .ok_or(VaultError::MathOverflow)?;
    let denominator = U256::from(denominator);

    let mut quotient = numerator / denominator;
    if rounding == Rounding::Up && !(numerator % denominator).is_zero() {
        quotient = quotient
            .checked_add(U256::one())
            .ok_or(VaultError::MathOverflow)?;
    }

    require!(
        quotient <= U256::from(u128::MAX),
        VaultError::MathOverflow
    );
    Ok(quotient.as_u128())
}

/// Narrow an engine amount to an SPL token amount
pub fn to_token_amount(amount: u128) -> Result<u64> {
    u64::try_from(amount).map_err(|_| error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 10, 3, Rounding::Down).unwrap(), 33);
        assert_eq!(mul_div(10, 10, 3, Rounding::Up).unwrap(), 34);
        // Exact division never rounds up
        assert_eq!(mul_div(10, 9, 3, Rounding::Up).unwrap(), 30);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u128::MAX * 2 overflows u128 but the quotient fits
        assert_eq!(
            mul_div(u128::MAX, 2, 4, Rounding::Down).unwrap(),
            u128::MAX / 2
        );
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Up).unwrap(), u128::MAX);
    }

    #[test]
    fn test_mul_div_overflow() {
        let err = mul_div(u128::MAX, 2, 1, Rounding::Down).unwrap_err();
        assert_eq!(err, Error::from(VaultError::MathOverflow));

        let err = mul_div(u128::MAX, 3, 2, Rounding::Up).unwrap_err();
        assert_eq!(err, Error::from(VaultError::MathOverflow));
    }

    #[test]
    fn test_mul_div_by_zero() {
        let err = mul_div(1, 1, 0, Rounding::Down).unwrap_err();
        assert_eq!(err, Error::from(VaultError::DivisionByZero));
    }

    #[test]
    fn test_to_token_amount() {
        assert_eq!(to_token_amount(u64::MAX as u128).unwrap(), u64::MAX);
        assert!(to_token_amount(u64::MAX as u128 + 1).is_err());
    }
}
