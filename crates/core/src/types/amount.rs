//! Monetary amounts as reported by the terminal.

use core::fmt;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in the terminal's smallest currency unit (e.g. cents).
///
/// The host reports totals as plain JSON numbers; they are held as
/// [`Decimal`] so threshold comparisons are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Create an amount from whole minor units.
    #[must_use]
    pub fn from_minor_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self::from_minor_units(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_exact() {
        assert!(Amount::from(20_000) > Amount::from(19_999));
        assert!(Amount::from(19_999) <= Amount::from(19_999));
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let amount: Amount = serde_json::from_str("12550").unwrap();
        assert_eq!(amount, Amount::from(12_550));

        let fractional: Amount = serde_json::from_str("10.5").unwrap();
        assert_eq!(fractional.value(), Decimal::new(105, 1));
    }

    #[test]
    fn test_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(Amount::default().is_zero());
        assert_eq!(Amount::from(2) + Amount::from(3), Amount::from(5));
    }
}
