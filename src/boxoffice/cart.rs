//! The shopping cart: a session-local price quote, never an inventory hold.
//!
//! A cart belongs to one browsing session and one festival. It expires 15
//! minutes after it first becomes non-empty; expiry only clears local state,
//! since no quota is reserved before checkout. All derived prices are
//! recomputed from current state by [`Cart::pricing`]; nothing is cached.

use super::category::{CategoryId, TicketCategory};
use super::error::TicketingError;
use super::pricing::{self, Discount, PricingBreakdown};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

/// How long a cart may sit idle before it expires: 15 minutes.
pub const CART_TTL_MILLIS: u64 = 15 * 60 * 1_000;

/// One line of a cart: a category and how many units of it.
///
/// `unit_price` is a display snapshot taken when the line was added; the
/// checkout re-prices from current category data and never trusts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The category selected.
    pub category_id: CategoryId,
    /// Units selected, always within `[1, max_quantity]`.
    pub quantity: u32,
    /// Unit price at the time the line was added.
    pub unit_price: Decimal,
    /// Upper bound for `quantity` (the category's per-user cap).
    pub max_quantity: u32,
}

/// A validated promo code attached to a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// The code as entered.
    pub code: String,
    /// The discount rule.
    pub discount: Discount,
    /// Minimum subtotal required for the code to grant anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_purchase: Option<Decimal>,
    /// Upper bound on the granted discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Decimal>,
}

/// External promo-rule storage, queried when a code is applied to a cart.
///
/// Implementations validate the code against the festival and the current
/// subtotal and return the discount rule, or
/// [`TicketingError::UnknownPromoCode`] for codes that do not exist.
pub trait PromoRules {
    /// Looks up and validates a promo code for a festival.
    fn validate(
        &self,
        code: &str,
        festival_id: Uuid,
        subtotal: Decimal,
    ) -> Result<PromoCode, TicketingError>;
}

/// A prospective purchase under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// The festival all line items belong to; `None` while empty.
    festival_id: Option<Uuid>,
    /// Line items in insertion order, at most one per category.
    items: Vec<CartItem>,
    /// Applied promo code, if any.
    promo_code: Option<PromoCode>,
    /// Expiry instant (epoch millis); `None` while empty.
    expires_at: Option<u64>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The festival this cart shops for, if any items are present.
    #[must_use]
    pub fn festival_id(&self) -> Option<Uuid> {
        self.festival_id
    }

    /// The line items.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The applied promo code.
    #[must_use]
    pub fn promo_code(&self) -> Option<&PromoCode> {
        self.promo_code.as_ref()
    }

    /// The expiry instant, while non-empty.
    #[must_use]
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// True when the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all line items.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// True when the cart has sat idle past its expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    /// Clears the cart if it has expired; returns whether it did.
    ///
    /// Every mutating operation calls this first, so a stale cart behaves
    /// as an empty one on its next use.
    pub fn purge_expired(&mut self, now: u64) -> bool {
        if self.is_expired(now) {
            trace!("cart expired, clearing");
            self.clear();
            true
        } else {
            false
        }
    }

    /// Adds units of a category, merging into an existing line.
    ///
    /// The stored quantity is clamped to
    /// `[0, min(max_per_user, available)]`; a clamp to zero removes the
    /// line. Adding a category from a different festival than the cart
    /// currently holds discards the previous selection first: switching
    /// festivals clears the cart.
    ///
    /// Returns the quantity now stored for this category.
    pub fn add_item(
        &mut self,
        category: &TicketCategory,
        quantity: u32,
        available: u32,
        now: u64,
    ) -> u32 {
        self.purge_expired(now);

        if self
            .festival_id
            .is_some_and(|festival| festival != category.festival_id)
        {
            trace!("cart switched festivals, clearing previous selection");
            self.clear();
        }

        let was_empty = self.items.is_empty();
        let ceiling = category.max_per_user.min(available);

        let existing = self
            .items
            .iter()
            .position(|line| line.category_id == category.id);
        let stored = match existing {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line.quantity.saturating_add(quantity).min(ceiling);
                line.unit_price = category.unit_price;
                line.quantity
            }
            None => {
                let clamped = quantity.min(ceiling);
                if clamped == 0 {
                    return 0;
                }
                self.items.push(CartItem {
                    category_id: category.id,
                    quantity: clamped,
                    unit_price: category.unit_price,
                    max_quantity: category.max_per_user,
                });
                clamped
            }
        };

        if stored == 0 {
            self.remove_item(category.id, now);
            return 0;
        }

        self.festival_id = Some(category.festival_id);
        if was_empty {
            self.expires_at = Some(now + CART_TTL_MILLIS);
        }
        stored
    }

    /// Sets the quantity of an existing line, clamped to
    /// `[0, min(max_quantity, available)]`. Zero removes the line.
    ///
    /// Returns the quantity now stored, or `None` when no line exists for
    /// the category.
    pub fn update_quantity(
        &mut self,
        category_id: CategoryId,
        quantity: u32,
        available: u32,
        now: u64,
    ) -> Option<u32> {
        self.purge_expired(now);

        let index = self
            .items
            .iter()
            .position(|line| line.category_id == category_id)?;
        let clamped = quantity.min(self.items[index].max_quantity).min(available);
        if clamped == 0 {
            self.remove_item(category_id, now);
            return Some(0);
        }
        self.items[index].quantity = clamped;
        Some(clamped)
    }

    /// Removes a line. Removing the last line clears the whole cart,
    /// including the promo code and expiry.
    pub fn remove_item(&mut self, category_id: CategoryId, now: u64) {
        self.purge_expired(now);
        self.items.retain(|line| line.category_id != category_id);
        if self.items.is_empty() {
            self.clear();
        }
    }

    /// Applies a promo code through external promo-rule storage.
    ///
    /// Idempotent: re-applying any code replaces the previous one and
    /// recomputes from scratch; discounts never stack.
    ///
    /// # Errors
    /// [`TicketingError::CartExpired`] when the cart lapsed,
    /// [`TicketingError::Validation`] on an empty cart, the validator's
    /// error for unknown codes, or [`TicketingError::PromoBelowMinimum`]
    /// when the subtotal does not reach the code's minimum.
    pub fn apply_promo_code(
        &mut self,
        code: &str,
        rules: &dyn PromoRules,
        now: u64,
    ) -> Result<PricingBreakdown, TicketingError> {
        if self.purge_expired(now) {
            return Err(TicketingError::CartExpired);
        }
        let festival_id = self.festival_id.ok_or_else(|| TicketingError::Validation {
            message: "cannot apply a promo code to an empty cart".to_string(),
        })?;

        let subtotal = self.pricing_without_promo().subtotal;
        let promo = rules.validate(code, festival_id, subtotal)?;

        if let Some(min) = promo.min_purchase {
            if subtotal < min {
                return Err(TicketingError::PromoBelowMinimum {
                    min_purchase: min,
                    subtotal,
                });
            }
        }

        trace!("applied promo code {} to cart", promo.code);
        self.promo_code = Some(promo);
        Ok(self.pricing())
    }

    /// Empties the cart: items, promo code, expiry, and festival binding.
    pub fn clear(&mut self) {
        self.items.clear();
        self.promo_code = None;
        self.expires_at = None;
        self.festival_id = None;
    }

    /// Derives the full price of the cart's current state.
    ///
    /// A pure function of the items and promo code; calling it twice with
    /// unchanged state yields identical output.
    #[must_use]
    pub fn pricing(&self) -> PricingBreakdown {
        pricing::breakdown(&self.items, self.promo_code.as_ref())
    }

    fn pricing_without_promo(&self) -> PricingBreakdown {
        pricing::breakdown(&self.items, None)
    }
}
