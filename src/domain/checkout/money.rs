//! Fixed-point monetary amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::domain::foundation::ValidationError;

const SCALE: u32 = 2;

/// Non-negative amount with two decimal places, at most [`Money::MAX`].
///
/// Serializes as a JSON float so integral values keep their fraction
/// (`122.0`, never `122`), which is how the gateway canonicalizes amounts.
/// Twelve significant digits always render as plain decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// 9 999 999 999.99, the range of the `NUMERIC(12, 2)` amount column.
    pub const MAX: Money = Money(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, SCALE));

    /// Creates an amount, rounding half away from zero to two places.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("must not be negative, got {}", amount),
            ));
        }
        Self(round(amount)).within_max("amount")
    }

    /// Returns `self` unless it exceeds [`Money::MAX`].
    pub fn within_max(self, field: &str) -> Result<Self, ValidationError> {
        if self > Money::MAX {
            return Err(ValidationError::invalid_format(
                field,
                format!("must not exceed {}, got {}", Money::MAX, self),
            ));
        }
        Ok(self)
    }

    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::new(cents as i64, SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Line amount for `quantity` units.
    pub fn times(&self, quantity: u32) -> Money {
        Money(round(self.0 * Decimal::from(quantity)))
    }

    /// `percent`% of this amount, rounded to two places.
    pub fn percent(&self, percent: u32) -> Money {
        Money(round(self.0 * Decimal::from(percent) / Decimal::ONE_HUNDRED))
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        let decimal = Decimal::try_from(raw).map_err(serde::de::Error::custom)?;
        Money::new(decimal).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}
