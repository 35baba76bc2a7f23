//! Pure pricing derivation for carts: subtotal, promo discount, and fees.
//!
//! Every function here is a pure function of its inputs. Derived prices are
//! never cached on the cart; callers recompute the [`PricingBreakdown`]
//! whenever items or the promo code change, so displayed prices cannot
//! drift from their inputs.

use super::cart::{CartItem, PromoCode};
use super::money::round_minor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Service fee rate applied to the discounted subtotal: 5%.
#[must_use]
#[inline]
pub fn service_fee_rate() -> Decimal {
    Decimal::new(5, 2)
}

/// Variable part of the processing fee, applied to the discounted subtotal
/// plus service fee: 2.9%.
#[must_use]
#[inline]
pub fn processing_fee_rate() -> Decimal {
    Decimal::new(29, 3)
}

/// Fixed part of the processing fee: 0.30 in the minor currency unit.
///
/// Waived entirely when the fee base is zero or negative, so an empty or
/// fully discounted cart never charges the fixed component.
#[must_use]
#[inline]
pub fn processing_fee_fixed() -> Decimal {
    Decimal::new(30, 2)
}

/// A promo code's discount rule: a percentage of the subtotal or a fixed
/// amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, e.g. `Percentage(10)` for 10% off.
    Percentage(Decimal),
    /// Fixed amount off, in the cart's currency.
    Fixed(Decimal),
}

/// Fully derived price of a cart at one instant.
///
/// Produced by [`breakdown`]; all components are rounded to the minor
/// currency unit and `total` is the sum of the rounded components, floored
/// at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Sum of `unit_price × quantity` over all line items.
    pub subtotal: Decimal,
    /// Promo discount, clamped to `[0, subtotal]`.
    pub discount: Decimal,
    /// 5% of the discounted subtotal.
    pub service_fee: Decimal,
    /// 2.9% of (discounted subtotal + service fee) plus 0.30; zero when
    /// that base is zero or negative.
    pub processing_fee: Decimal,
    /// `subtotal − discount + service_fee + processing_fee`, never negative.
    pub total: Decimal,
}

impl PricingBreakdown {
    /// A breakdown with every component zero, the price of an empty cart.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            processing_fee: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// True when nothing is charged.
    #[must_use]
    #[inline]
    pub fn is_free(&self) -> bool {
        self.total.is_zero()
    }
}

/// Computes the discount a promo code grants on a subtotal.
///
/// The result is clamped to `[0, subtotal]` and capped at the code's
/// `max_discount` when present. A code whose `min_purchase` the subtotal
/// does not reach grants nothing.
///
/// # Examples
///
/// ```
/// use boxoffice_rs::boxoffice::cart::PromoCode;
/// use boxoffice_rs::boxoffice::pricing::{Discount, discount_for};
/// use rust_decimal::Decimal;
///
/// let promo = PromoCode {
///     code: "SUMMER10".to_string(),
///     discount: Discount::Percentage(Decimal::new(10, 0)),
///     min_purchase: None,
///     max_discount: None,
/// };
/// // 10% of 100.00 = 10.00
/// assert_eq!(
///     discount_for(&promo, Decimal::new(10000, 2)),
///     Decimal::new(1000, 2)
/// );
/// ```
#[must_use]
pub fn discount_for(promo: &PromoCode, subtotal: Decimal) -> Decimal {
    if promo
        .min_purchase
        .is_some_and(|min| subtotal < min)
    {
        return Decimal::ZERO;
    }

    let raw = match promo.discount {
        Discount::Percentage(percent) => subtotal * percent / Decimal::ONE_HUNDRED,
        Discount::Fixed(amount) => amount,
    };

    let capped = match promo.max_discount {
        Some(cap) => raw.min(cap),
        None => raw,
    };

    round_minor(capped.clamp(Decimal::ZERO, subtotal))
}

/// Derives the full [`PricingBreakdown`] for a set of line items and an
/// optional promo code.
///
/// Deterministic: identical inputs always produce identical output. Each
/// component is rounded to the minor currency unit before the total is
/// summed.
///
/// # Examples
///
/// ```
/// use boxoffice_rs::boxoffice::cart::{CartItem, PromoCode};
/// use boxoffice_rs::boxoffice::category::CategoryId;
/// use boxoffice_rs::boxoffice::pricing::{Discount, breakdown};
/// use rust_decimal::Decimal;
///
/// let items = vec![CartItem {
///     category_id: CategoryId::new(),
///     quantity: 2,
///     unit_price: Decimal::new(5000, 2), // 50.00
///     max_quantity: 4,
/// }];
/// let promo = PromoCode {
///     code: "SUMMER10".to_string(),
///     discount: Discount::Percentage(Decimal::new(10, 0)),
///     min_purchase: None,
///     max_discount: None,
/// };
///
/// let pricing = breakdown(&items, Some(&promo));
/// assert_eq!(pricing.subtotal, Decimal::new(10000, 2)); // 100.00
/// assert_eq!(pricing.discount, Decimal::new(1000, 2)); // 10.00
/// assert_eq!(pricing.service_fee, Decimal::new(450, 2)); // 90 × 5% = 4.50
/// assert_eq!(pricing.processing_fee, Decimal::new(304, 2)); // 94.50 × 2.9% + 0.30 = 3.04
/// assert_eq!(pricing.total, Decimal::new(9754, 2)); // 97.54
/// ```
#[must_use]
pub fn breakdown(items: &[CartItem], promo: Option<&PromoCode>) -> PricingBreakdown {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum();
    let subtotal = round_minor(subtotal);

    let discount = promo.map_or(Decimal::ZERO, |p| discount_for(p, subtotal));

    let base = subtotal - discount;
    let service_fee = round_minor(base * service_fee_rate());

    let processing_base = base + service_fee;
    let processing_fee = if processing_base > Decimal::ZERO {
        round_minor(processing_base * processing_fee_rate() + processing_fee_fixed())
    } else {
        Decimal::ZERO
    };

    let total = (base + service_fee + processing_fee).max(Decimal::ZERO);

    PricingBreakdown {
        subtotal,
        discount,
        service_fee,
        processing_fee,
        total,
    }
}
