//! Conversion between decimal ledger amounts and the integer minor units
//! (cents) exchanged with the payment provider.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("{0} cannot be represented in minor units")]
    Overflow(Decimal),
}

/// Converts a decimal amount to minor units.
///
/// The amount is first rounded to 2 decimal places, then scaled by 100 and
/// rounded again, both half away from zero. Every comparison between a local
/// total and a provider amount goes through this function so both sides share
/// one formula.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] when the scaled value does not fit in `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::Overflow(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::Overflow(amount))
}

/// Inverse of [`to_minor_units`] for values that already are whole cents.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}
