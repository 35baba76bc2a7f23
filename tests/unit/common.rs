//! Shared fixtures for the integration suites.

use boxoffice_rs::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// An engine whose festival starts in the far future.
pub fn engine() -> BoxOffice {
    BoxOffice::new(Uuid::new_v4(), "Integration Fest", u64::MAX, b"gate-secret")
}

/// Builds and registers a category that is on sale right now.
pub fn add_category(
    engine: &BoxOffice,
    kind: CategoryKind,
    price_cents: i64,
    quota: u32,
    max_per_user: u32,
) -> TicketCategory {
    let category = TicketCategory {
        id: CategoryId::new(),
        festival_id: engine.festival_id(),
        name: format!("{kind:?}"),
        kind,
        unit_price: Decimal::new(price_cents, 2),
        currency: Currency::Eur,
        quota,
        max_per_user,
        sale_start: 0,
        sale_end: u64::MAX,
        is_active: true,
    };
    engine.add_category(category.clone()).unwrap();
    category
}

/// A cart holding `quantity` units of one category.
pub fn cart_with(engine: &BoxOffice, category: &TicketCategory, quantity: u32) -> Cart {
    let mut cart = Cart::new();
    let available = engine.available(category.id).unwrap_or(0);
    cart.add_item(category, quantity, available, current_time_millis());
    cart
}

/// Payment gateway double that authorizes exactly the requested amount.
pub struct AutoApprove;

impl PaymentGateway for AutoApprove {
    fn confirm(
        &self,
        _purchaser: OwnerId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<PaymentConfirmation, TicketingError> {
        Ok(PaymentConfirmation {
            payment_id: Uuid::new_v4(),
            amount,
            currency,
        })
    }
}
