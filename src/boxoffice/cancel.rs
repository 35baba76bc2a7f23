//! Ticket cancellation: the refund path.

use super::engine::BoxOffice;
use super::error::TicketingError;
use super::ticket::{OwnerId, TicketId, TicketSnapshot, TicketStatus};
use crate::utils::current_time_millis;
use std::sync::Arc;
use tracing::trace;

impl BoxOffice {
    /// Cancels a SOLD ticket, returning its unit to the category's quota.
    ///
    /// Only the ticket's owner may cancel, and only before the festival
    /// starts. The status check and transition are one compare-and-set, so
    /// a cancellation racing a gate scan resolves to exactly one winner: a
    /// ticket that was scanned first can no longer be cancelled, and a
    /// ticket cancelled first can no longer be scanned.
    ///
    /// The ticket's QR token stays resolvable so a later scan reports the
    /// cancellation rather than an unknown token.
    ///
    /// # Errors
    /// [`TicketingError::TicketNotFound`], [`TicketingError::Forbidden`],
    /// [`TicketingError::FestivalStarted`],
    /// [`TicketingError::TicketAlreadyUsed`],
    /// [`TicketingError::TicketCancelled`] (already cancelled), or
    /// [`TicketingError::TicketNotSold`].
    pub fn cancel(
        &self,
        ticket_id: TicketId,
        requester: OwnerId,
    ) -> Result<TicketSnapshot, TicketingError> {
        let now = current_time_millis();

        let ticket = self
            .tickets
            .get(&ticket_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(TicketingError::TicketNotFound { ticket_id })?;

        if ticket.owner() != requester {
            return Err(TicketingError::Forbidden {
                message: format!("ticket {ticket_id} belongs to another attendee"),
            });
        }
        if now >= self.festival_starts_at {
            return Err(TicketingError::FestivalStarted {
                festival_id: self.festival_id,
            });
        }

        match ticket.cancel() {
            Ok(()) => {
                self.ledger
                    .release_units(ticket.category_id(), ticket.owner(), 1);
                trace!("cancelled ticket {}", ticket_id);
                Ok(ticket.snapshot())
            }
            Err(TicketStatus::Used) => Err(TicketingError::TicketAlreadyUsed { ticket_id }),
            Err(TicketStatus::Cancelled) => Err(TicketingError::TicketCancelled { ticket_id }),
            Err(_) => Err(TicketingError::TicketNotSold { ticket_id }),
        }
    }
}
