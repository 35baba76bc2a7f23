//! Fixed-precision money primitives shared by pricing and checkout.
//!
//! All monetary values in the engine are [`rust_decimal::Decimal`]s rounded
//! to the minor currency unit (two decimal places). Floating point is never
//! used for money.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places in the minor currency unit (cents).
pub const MINOR_UNIT_DECIMALS: u32 = 2;

/// ISO-style currency tag carried by categories, tickets, and payments.
///
/// A festival sells in exactly one currency; the checkout rejects carts
/// that mix currencies across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Euro
    Eur,
    /// US dollar
    Usd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Eur => write!(f, "EUR"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

/// Rounds a monetary amount to the minor currency unit.
///
/// Uses half-up rounding (midpoint away from zero), the convention for
/// customer-facing prices.
///
/// # Examples
///
/// ```
/// use boxoffice_rs::boxoffice::money::round_minor;
/// use rust_decimal::Decimal;
///
/// // 3.0405 rounds down to 3.04
/// assert_eq!(round_minor(Decimal::new(30405, 4)), Decimal::new(304, 2));
/// // 2.745 rounds up to 2.75
/// assert_eq!(round_minor(Decimal::new(2745, 3)), Decimal::new(275, 2));
/// ```
#[must_use]
#[inline]
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(n: i64) -> Decimal {
        Decimal::new(n, 2)
    }

    #[test]
    fn test_round_minor_already_exact() {
        assert_eq!(round_minor(cents(1050)), cents(1050));
    }

    #[test]
    fn test_round_minor_half_up() {
        // .005 goes away from zero
        assert_eq!(round_minor(Decimal::new(10005, 3)), cents(1001));
        assert_eq!(round_minor(Decimal::new(-10005, 3)), cents(-1001));
    }

    #[test]
    fn test_round_minor_truncates_below_half() {
        assert_eq!(round_minor(Decimal::new(100049, 4)), cents(1000));
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Usd.to_string(), "USD");
    }

    #[test]
    fn test_currency_serde_uppercase() {
        let json = serde_json::to_string(&Currency::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::Eur);
    }
}
