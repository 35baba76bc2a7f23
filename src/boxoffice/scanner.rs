//! Gate scanning: QR token resolution, zone checks, at-most-once admission.

use super::category::Zone;
use super::engine::BoxOffice;
use super::ticket::{TicketSnapshot, TicketStatus};
use crate::utils::current_time_millis;
use serde::Serialize;
use thiserror::Error;

/// Why a scan or pre-check refused admission.
///
/// Rejections are always surfaced to gate staff; a refused scan is never
/// silently retried, since only the atomic admission itself may decide
/// between two racing scans.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanRejection {
    /// The token matches no ticket of this festival.
    #[error("unknown QR token")]
    UnknownToken,
    /// The ticket was already admitted once.
    #[error("ticket already used")]
    AlreadyUsed,
    /// The ticket was cancelled and refunded.
    #[error("ticket has been cancelled")]
    Cancelled,
    /// The ticket never completed a purchase.
    #[error("ticket was never sold")]
    NotSold,
    /// The ticket's category does not grant access to the requested zone.
    #[error("no access to {zone}")]
    ZoneDenied {
        /// The zone that was refused.
        zone: Zone,
    },
}

/// Result of a gate scan or pre-check.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Whether the bearer is (or would be) admitted.
    pub admitted: bool,
    /// The resolved ticket, when the token matched one.
    pub ticket: Option<TicketSnapshot>,
    /// Why admission was refused, when it was.
    pub reason: Option<ScanRejection>,
}

impl ScanOutcome {
    fn admitted(ticket: TicketSnapshot) -> Self {
        Self {
            admitted: true,
            ticket: Some(ticket),
            reason: None,
        }
    }

    fn rejected(reason: ScanRejection, ticket: Option<TicketSnapshot>) -> Self {
        Self {
            admitted: false,
            ticket,
            reason: Some(reason),
        }
    }
}

impl BoxOffice {
    /// Scans a QR token at a gate, admitting the bearer at most once.
    ///
    /// Admission requires a SOLD ticket and, when `zone` is given, category
    /// access rights for that zone. The status check and the SOLD → USED
    /// transition are a single compare-and-set: of two simultaneous scans
    /// of the same token, exactly one admits; the other observes USED and
    /// is rejected.
    #[must_use]
    pub fn scan(&self, qr_token: &str, zone: Option<Zone>) -> ScanOutcome {
        let now = current_time_millis();

        let ticket = match self.resolve_token(qr_token) {
            Some(ticket) => ticket,
            None => return ScanOutcome::rejected(ScanRejection::UnknownToken, None),
        };

        if let Some(zone) = zone {
            if !ticket.access().contains(zone.required_access()) {
                return ScanOutcome::rejected(
                    ScanRejection::ZoneDenied { zone },
                    Some(ticket.snapshot()),
                );
            }
        }

        match ticket.mark_used(now) {
            Ok(()) => ScanOutcome::admitted(ticket.snapshot()),
            Err(TicketStatus::Used) => {
                ScanOutcome::rejected(ScanRejection::AlreadyUsed, Some(ticket.snapshot()))
            }
            Err(TicketStatus::Cancelled) => {
                ScanOutcome::rejected(ScanRejection::Cancelled, Some(ticket.snapshot()))
            }
            Err(_) => ScanOutcome::rejected(ScanRejection::NotSold, Some(ticket.snapshot())),
        }
    }

    /// Pre-checks a QR token without consuming it.
    ///
    /// Performs the same resolution and rule checks as [`Self::scan`] but
    /// never mutates ticket state, for advance verification at a turnstile
    /// display. `admitted` here means "a scan right now would admit".
    #[must_use]
    pub fn validate(&self, qr_token: &str, zone: Option<Zone>) -> ScanOutcome {
        let ticket = match self.resolve_token(qr_token) {
            Some(ticket) => ticket,
            None => return ScanOutcome::rejected(ScanRejection::UnknownToken, None),
        };

        if let Some(zone) = zone {
            if !ticket.access().contains(zone.required_access()) {
                return ScanOutcome::rejected(
                    ScanRejection::ZoneDenied { zone },
                    Some(ticket.snapshot()),
                );
            }
        }

        match ticket.status() {
            TicketStatus::Sold => ScanOutcome::admitted(ticket.snapshot()),
            TicketStatus::Used => {
                ScanOutcome::rejected(ScanRejection::AlreadyUsed, Some(ticket.snapshot()))
            }
            TicketStatus::Cancelled => {
                ScanOutcome::rejected(ScanRejection::Cancelled, Some(ticket.snapshot()))
            }
            TicketStatus::Reserved => {
                ScanOutcome::rejected(ScanRejection::NotSold, Some(ticket.snapshot()))
            }
        }
    }
}
