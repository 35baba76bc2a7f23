//! Completed-sale results, sale event listeners, and the payment seam.

use super::error::TicketingError;
use super::money::Currency;
use super::pricing::PricingBreakdown;
use super::ticket::{OwnerId, TicketSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Proof from the payment provider that a charge was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    /// Provider-side identifier of the payment.
    pub payment_id: Uuid,
    /// The amount the provider authorized.
    pub amount: Decimal,
    /// Currency of the authorized amount.
    pub currency: Currency,
}

/// The external payment provider, as seen by the checkout.
///
/// The checkout hands the provider the server-computed total and treats a
/// returned confirmation as "payment confirmed". Client-submitted totals
/// never reach this seam; a confirmation whose amount differs from the
/// server total fails the checkout with
/// [`TicketingError::PriceMismatch`].
pub trait PaymentGateway: Send + Sync {
    /// Authorizes a charge for the given amount.
    ///
    /// # Errors
    /// [`TicketingError::PaymentDeclined`] when the provider refuses the
    /// charge.
    fn confirm(
        &self,
        purchaser: OwnerId,
        amount: Decimal,
        currency: Currency,
    ) -> Result<PaymentConfirmation, TicketingError>;
}

/// The outcome of a completed checkout: the tickets sold and the audited
/// price they were sold at.
#[derive(Debug, Clone, Serialize)]
pub struct SaleResult {
    /// The festival the tickets admit to.
    pub festival_id: Uuid,
    /// The purchaser.
    pub purchaser: OwnerId,
    /// Provider-side identifier of the confirmed payment.
    pub payment_id: Uuid,
    /// The server-computed price the sale settled at.
    pub pricing: PricingBreakdown,
    /// One snapshot per ticket sold (a quantity of 3 yields 3 tickets).
    pub tickets: Vec<TicketSnapshot>,
}

impl SaleResult {
    /// Number of tickets sold in this checkout.
    #[must_use]
    #[inline]
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }
}

/// Listener notified after every completed sale.
pub type SaleListener = Arc<dyn Fn(&SaleResult) + Send + Sync>;

/// A sale wrapped with routing metadata for manager channels.
#[derive(Debug, Clone)]
pub struct SaleEvent {
    /// The festival the sale belongs to.
    pub festival_id: Uuid,
    /// The sale itself.
    pub sale: SaleResult,
    /// Epoch millis when the sale completed.
    pub timestamp: u64,
}
