//! Checkout orchestration: cart → payment → tickets, all or nothing.

use super::cart::Cart;
use super::engine::BoxOffice;
use super::error::TicketingError;
use super::pricing;
use super::quota::Allocation;
use super::sale::{PaymentGateway, SaleResult};
use super::ticket::{OwnerId, Ticket};
use crate::utils::current_time_millis;
use std::sync::Arc;
use tracing::trace;

impl BoxOffice {
    /// Purchases the contents of a cart.
    ///
    /// Steps, in order:
    /// 1. Re-check the cart's expiry and festival binding.
    /// 2. Reserve quota for every line. The first failed reservation
    ///    releases every reservation already taken and is surfaced
    ///    verbatim. A checkout never partially purchases.
    /// 3. Re-price the cart from current category prices (the cart's own
    ///    price snapshots are never trusted) and confirm the charge with
    ///    the payment provider. A confirmation whose amount differs from
    ///    the server total, a decline, or any later failure likewise
    ///    unwinds every reservation.
    /// 4. Materialize one SOLD ticket per unit purchased, each with a
    ///    frozen price and a fresh QR token.
    /// 5. Clear the cart and notify the sale listener.
    ///
    /// # Errors
    /// [`TicketingError::CartExpired`], [`TicketingError::Validation`],
    /// [`TicketingError::QuotaExceeded`],
    /// [`TicketingError::PerUserLimitExceeded`],
    /// [`TicketingError::SaleWindowClosed`],
    /// [`TicketingError::CategoryNotFound`],
    /// [`TicketingError::PriceMismatch`], or
    /// [`TicketingError::PaymentDeclined`].
    pub fn checkout(
        &self,
        cart: &mut Cart,
        purchaser: OwnerId,
        gateway: &dyn PaymentGateway,
    ) -> Result<SaleResult, TicketingError> {
        let now = current_time_millis();

        if cart.purge_expired(now) {
            return Err(TicketingError::CartExpired);
        }
        if cart.is_empty() {
            return Err(TicketingError::Validation {
                message: "cannot check out an empty cart".to_string(),
            });
        }
        if cart.festival_id() != Some(self.festival_id) {
            return Err(TicketingError::Validation {
                message: "cart belongs to a different festival".to_string(),
            });
        }

        // Phase 1: reserve every line, all or nothing.
        let lines = cart.items().to_vec();
        let mut allocations: Vec<Allocation> = Vec::with_capacity(lines.len());
        let mut purchased = Vec::with_capacity(lines.len());
        for line in &lines {
            let category = match self.category(line.category_id) {
                Some(category) => category,
                None => {
                    self.unwind(&mut allocations);
                    return Err(TicketingError::CategoryNotFound {
                        category_id: line.category_id,
                    });
                }
            };
            match self
                .ledger
                .reserve(&category, purchaser, line.quantity, now)
            {
                Ok(allocation) => {
                    allocations.push(allocation);
                    purchased.push((category, line.quantity));
                }
                Err(error) => {
                    self.unwind(&mut allocations);
                    return Err(error);
                }
            }
        }

        // Phase 2: re-price server-side from current category data.
        let currency = purchased[0].0.currency;
        if purchased.iter().any(|(category, _)| category.currency != currency) {
            self.unwind(&mut allocations);
            return Err(TicketingError::Validation {
                message: "cart mixes currencies".to_string(),
            });
        }
        let repriced: Vec<_> = purchased
            .iter()
            .map(|(category, quantity)| super::cart::CartItem {
                category_id: category.id,
                quantity: *quantity,
                unit_price: category.unit_price,
                max_quantity: category.max_per_user,
            })
            .collect();
        let breakdown = pricing::breakdown(&repriced, cart.promo_code());

        // Phase 3: payment confirmation against the server total.
        let confirmation = match gateway.confirm(purchaser, breakdown.total, currency) {
            Ok(confirmation) if confirmation.amount == breakdown.total => confirmation,
            Ok(confirmation) => {
                self.unwind(&mut allocations);
                return Err(TicketingError::PriceMismatch {
                    expected: breakdown.total,
                    authorized: confirmation.amount,
                });
            }
            Err(error) => {
                self.unwind(&mut allocations);
                return Err(error);
            }
        };

        // Phase 4: materialize one ticket per unit purchased.
        let mut snapshots = Vec::with_capacity(cart.total_units() as usize);
        for (category, quantity) in &purchased {
            for _ in 0..*quantity {
                let ticket = Arc::new(Ticket::new_sold(category, purchaser, &self.qr_secret, now));
                snapshots.push(ticket.snapshot());
                self.track_ticket(ticket);
            }
        }
        for allocation in allocations {
            self.ledger.commit(allocation);
        }

        // Phase 5: the quote is consumed.
        cart.clear();

        let sale = SaleResult {
            festival_id: self.festival_id,
            purchaser,
            payment_id: confirmation.payment_id,
            pricing: breakdown,
            tickets: snapshots,
        };
        trace!(
            "checkout complete: {} tickets for {} at {}",
            sale.ticket_count(),
            purchaser,
            sale.pricing.total
        );
        if let Some(ref listener) = self.sale_listener {
            listener(&sale);
        }
        Ok(sale)
    }

    /// Releases every reservation taken so far in a failing checkout.
    fn unwind(&self, allocations: &mut Vec<Allocation>) {
        for allocation in allocations.drain(..) {
            self.ledger.release(allocation);
        }
    }
}
