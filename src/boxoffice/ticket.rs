//! Tickets and their lifecycle state machine.
//!
//! A ticket's status moves RESERVED → SOLD → USED, or SOLD → CANCELLED.
//! USED and CANCELLED are terminal. Status lives in an atomic cell so every
//! transition is a single compare-and-set; two racing writers can never both
//! observe success for the same transition.

use super::category::{CategoryId, TicketCategory, ZoneAccess};
use super::money::Currency;
use crossbeam::atomic::AtomicCell;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier of a ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Generates a fresh random ticket id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a purchaser.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Generates a fresh random owner id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller role for access-controlled queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular attendee; may only see their own tickets.
    Attendee,
    /// Festival staff.
    Staff,
    /// Gate security.
    Security,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// True for roles that may read tickets they do not own.
    #[must_use]
    #[inline]
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Security | Role::Admin)
    }
}

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Transient mid-checkout state; never visible outside a checkout.
    Reserved,
    /// Purchase completed; the ticket is scannable.
    Sold,
    /// Scanned at the gate. Terminal.
    Used,
    /// Cancelled and refunded. Terminal.
    Cancelled,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Reserved => write!(f, "RESERVED"),
            TicketStatus::Sold => write!(f, "SOLD"),
            TicketStatus::Used => write!(f, "USED"),
            TicketStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Issues an opaque QR bearer token for a ticket.
///
/// The token is the hex SHA-256 of the server secret, the ticket id, and a
/// random nonce. The nonce makes tokens unguessable even with knowledge of
/// ticket ids; the secret binds them to this deployment. Tokens are never
/// derived from sequential ids, so tickets cannot be enumerated.
#[must_use]
pub fn issue_qr_token(secret: &[u8], ticket_id: TicketId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(ticket_id.as_uuid().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A single admission ticket.
///
/// `status` and `used_at` are the only mutable fields; all mutation goes
/// through the compare-and-set methods so concurrent scanners and
/// cancellations serialize on the atomic cell.
#[derive(Debug)]
pub struct Ticket {
    id: TicketId,
    category_id: CategoryId,
    festival_id: Uuid,
    owner: OwnerId,
    qr_token: String,
    purchase_price: Decimal,
    currency: Currency,
    access: ZoneAccess,
    purchased_at: u64,
    status: AtomicCell<TicketStatus>,
    /// Epoch millis of the admitting scan; 0 while unused.
    used_at: AtomicU64,
}

impl Ticket {
    /// Materializes a SOLD ticket from a committed purchase.
    ///
    /// The purchase price and zone access are frozen from the category at
    /// this moment; later category changes do not affect the ticket. The
    /// QR token is issued here so it is bound to the ticket's own id.
    #[must_use]
    pub fn new_sold(
        category: &TicketCategory,
        owner: OwnerId,
        qr_secret: &[u8],
        purchased_at: u64,
    ) -> Self {
        let id = TicketId::new();
        let qr_token = issue_qr_token(qr_secret, id);
        Self {
            id,
            category_id: category.id,
            festival_id: category.festival_id,
            owner,
            qr_token,
            purchase_price: category.unit_price,
            currency: category.currency,
            access: category.zone_access(),
            purchased_at,
            status: AtomicCell::new(TicketStatus::Sold),
            used_at: AtomicU64::new(0),
        }
    }

    /// Rebuilds a ticket from a snapshot (restore path).
    #[must_use]
    pub fn from_snapshot(snapshot: &TicketSnapshot) -> Self {
        Self {
            id: snapshot.id,
            category_id: snapshot.category_id,
            festival_id: snapshot.festival_id,
            owner: snapshot.owner,
            qr_token: snapshot.qr_token.clone(),
            purchase_price: snapshot.purchase_price,
            currency: snapshot.currency,
            access: snapshot.access,
            purchased_at: snapshot.purchased_at,
            status: AtomicCell::new(snapshot.status),
            used_at: AtomicU64::new(snapshot.used_at.unwrap_or(0)),
        }
    }

    /// The ticket's unique id.
    #[must_use]
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// The category this ticket was sold from.
    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// The festival this ticket admits to.
    #[must_use]
    pub fn festival_id(&self) -> Uuid {
        self.festival_id
    }

    /// The purchaser.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The opaque QR bearer token.
    #[must_use]
    pub fn qr_token(&self) -> &str {
        &self.qr_token
    }

    /// The price frozen at purchase time.
    #[must_use]
    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    /// Currency of the purchase price.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Zone-access rights frozen at purchase time.
    #[must_use]
    pub fn access(&self) -> ZoneAccess {
        self.access
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status.load()
    }

    /// Epoch millis of the admitting scan, if any.
    #[must_use]
    pub fn used_at(&self) -> Option<u64> {
        match self.used_at.load(Ordering::Acquire) {
            0 => None,
            at => Some(at),
        }
    }

    /// Admits the ticket: SOLD → USED, stamping `used_at`.
    ///
    /// The status check and transition are one compare-and-set, so of two
    /// racing scans exactly one succeeds; the loser receives the status it
    /// observed instead. Only the winner writes `used_at`.
    pub fn mark_used(&self, now: u64) -> Result<(), TicketStatus> {
        self.status
            .compare_exchange(TicketStatus::Sold, TicketStatus::Used)
            .map(|_| self.used_at.store(now, Ordering::Release))
    }

    /// Cancels the ticket: SOLD → CANCELLED.
    ///
    /// Fails with the observed status when the ticket is not SOLD; a USED
    /// ticket can never be cancelled.
    pub fn cancel(&self) -> Result<(), TicketStatus> {
        self.status
            .compare_exchange(TicketStatus::Sold, TicketStatus::Cancelled)
            .map(|_| ())
    }

    /// Plain-value snapshot of the ticket, mirroring the atomic fields.
    #[must_use]
    pub fn snapshot(&self) -> TicketSnapshot {
        TicketSnapshot {
            id: self.id,
            category_id: self.category_id,
            festival_id: self.festival_id,
            owner: self.owner,
            qr_token: self.qr_token.clone(),
            purchase_price: self.purchase_price,
            currency: self.currency,
            access: self.access,
            purchased_at: self.purchased_at,
            status: self.status(),
            used_at: self.used_at(),
        }
    }
}

/// Serializable view of a [`Ticket`] at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    /// The ticket's unique id.
    pub id: TicketId,
    /// The category this ticket was sold from.
    pub category_id: CategoryId,
    /// The festival this ticket admits to.
    pub festival_id: Uuid,
    /// The purchaser.
    pub owner: OwnerId,
    /// The opaque QR bearer token.
    pub qr_token: String,
    /// The price frozen at purchase time.
    pub purchase_price: Decimal,
    /// Currency of the purchase price.
    pub currency: Currency,
    /// Zone-access rights frozen at purchase time.
    pub access: ZoneAccess,
    /// Epoch millis of the purchase.
    pub purchased_at: u64,
    /// Lifecycle status at snapshot time.
    pub status: TicketStatus,
    /// Epoch millis of the admitting scan, if any.
    pub used_at: Option<u64>,
}
