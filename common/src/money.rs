//! Fixed-scale decimal money type.
//!
//! All monetary quantities in the ledger are arbitrary-precision decimals
//! with a per-element scale (`element.decimals`) and half-up rounding for
//! tax division. Floating point never appears on the commit path.

use crate::error::MoneyError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Sub},
    str::FromStr,
};

/// An arbitrary-precision decimal amount.
///
/// `Money` wraps [`rust_decimal::Decimal`] rather than re-deriving
/// fixed-point arithmetic by hand: the ledger's tax and balance math needs
/// exact base-10 rounding, which `f64` cannot provide and which
/// `rust_decimal` is the standard crate for in the Rust ecosystem.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    pub fn from_str_exact(s: &str) -> Result<Self, MoneyError> {
        Decimal::from_str(s)
            .map(Money)
            .map_err(|e| MoneyError::InvalidAmount(e.to_string()))
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Round to `scale` decimal places using half-up (round half away from
    /// zero), the rounding mode spec.md fixes for tax division.
    pub fn round_half_up(&self, scale: u32) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Number of base-10 digits in the integer part of this amount, with a
    /// floor of 1 (so a zero amount counts as one digit). Used to derive
    /// block difficulty from total fees.
    pub fn integer_digit_count(&self) -> u32 {
        let truncated = self.0.trunc().abs();
        if truncated.is_zero() {
            return 1;
        }
        truncated.to_string().trim_start_matches('-').len() as u32
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// `self * (percent / 100)`, rounded half-up to `scale` places.
    pub fn percent_of(&self, percent: Money, scale: u32) -> Money {
        let rate = percent.0 / Decimal::ONE_HUNDRED;
        Money((self.0 * rate).round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::from_str_exact(&value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Money(Decimal::from(value))
    }
}
