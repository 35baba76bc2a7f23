//! Core `BoxOffice` engine: one festival's categories, quota, and tickets.

use super::category::{CategoryId, TicketCategory};
use super::error::TicketingError;
use super::quota::QuotaLedger;
use super::sale::SaleListener;
use super::ticket::{OwnerId, Role, Ticket, TicketId, TicketSnapshot};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// The checkout and inventory engine for a single festival.
///
/// The engine is the single source of truth for quota and ticket state.
/// All shared mutable state (sold counters in the ledger, ticket status)
/// is mutated only through atomic read-modify-write operations, so the
/// engine can be shared across request handlers behind an `Arc` without
/// external locking.
pub struct BoxOffice {
    /// The festival this engine sells for.
    pub(super) festival_id: Uuid,

    /// Human-readable festival name.
    pub(super) festival_name: String,

    /// Epoch millis of the festival's first day; cancellations stop here.
    pub(super) festival_starts_at: u64,

    /// Registered categories by id.
    pub(super) categories: DashMap<CategoryId, Arc<TicketCategory>>,

    /// Capacity accounting for every category.
    pub(super) ledger: QuotaLedger,

    /// All tickets ever materialized, by id.
    pub(super) tickets: DashMap<TicketId, Arc<Ticket>>,

    /// QR token → ticket id. Tokens stay resolvable after cancellation so
    /// a scan can report the cancellation instead of "unknown token".
    pub(super) tokens: DashMap<String, TicketId>,

    /// Owner → owned ticket ids, for listing queries.
    pub(super) owner_index: DashMap<OwnerId, Vec<TicketId>>,

    /// Server-side secret bound into every QR token.
    pub(super) qr_secret: Vec<u8>,

    /// Notified after every completed sale.
    pub sale_listener: Option<SaleListener>,
}

impl std::fmt::Debug for BoxOffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxOffice")
            .field("festival_id", &self.festival_id)
            .field("festival_name", &self.festival_name)
            .field("festival_starts_at", &self.festival_starts_at)
            .field("categories", &self.categories)
            .field("ledger", &self.ledger)
            .field("tickets", &self.tickets)
            .field("tokens", &self.tokens)
            .field("owner_index", &self.owner_index)
            .field("qr_secret", &self.qr_secret)
            .field("sale_listener", &self.sale_listener.as_ref().map(|_| "<listener>"))
            .finish()
    }
}

impl BoxOffice {
    /// Creates an engine for a festival.
    #[must_use]
    pub fn new(festival_id: Uuid, festival_name: &str, festival_starts_at: u64, qr_secret: &[u8]) -> Self {
        Self {
            festival_id,
            festival_name: festival_name.to_string(),
            festival_starts_at,
            categories: DashMap::new(),
            ledger: QuotaLedger::new(),
            tickets: DashMap::new(),
            tokens: DashMap::new(),
            owner_index: DashMap::new(),
            qr_secret: qr_secret.to_vec(),
            sale_listener: None,
        }
    }

    /// Creates an engine with a sale listener attached.
    #[must_use]
    pub fn with_sale_listener(
        festival_id: Uuid,
        festival_name: &str,
        festival_starts_at: u64,
        qr_secret: &[u8],
        listener: SaleListener,
    ) -> Self {
        let mut engine = Self::new(festival_id, festival_name, festival_starts_at, qr_secret);
        engine.sale_listener = Some(listener);
        engine
    }

    /// The festival this engine sells for.
    #[must_use]
    pub fn festival_id(&self) -> Uuid {
        self.festival_id
    }

    /// Human-readable festival name.
    #[must_use]
    pub fn festival_name(&self) -> &str {
        &self.festival_name
    }

    /// Epoch millis of the festival's first day.
    #[must_use]
    pub fn festival_starts_at(&self) -> u64 {
        self.festival_starts_at
    }

    /// Registers a sellable category and its capacity.
    ///
    /// # Errors
    /// [`TicketingError::Validation`] when the category belongs to a
    /// different festival or is already registered.
    pub fn add_category(&self, category: TicketCategory) -> Result<(), TicketingError> {
        if category.festival_id != self.festival_id {
            return Err(TicketingError::Validation {
                message: format!(
                    "category {} belongs to festival {}, not {}",
                    category.id, category.festival_id, self.festival_id
                ),
            });
        }
        self.ledger.register(&category)?;
        trace!("registered category {} ({})", category.id, category.name);
        self.categories.insert(category.id, Arc::new(category));
        Ok(())
    }

    /// Looks up a registered category.
    #[must_use]
    pub fn category(&self, category_id: CategoryId) -> Option<Arc<TicketCategory>> {
        self.categories
            .get(&category_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// All registered categories.
    #[must_use]
    pub fn categories(&self) -> Vec<Arc<TicketCategory>> {
        self.categories
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Units still available in a category, or `None` if unregistered.
    #[must_use]
    pub fn available(&self, category_id: CategoryId) -> Option<u32> {
        self.ledger.available(category_id)
    }

    /// Units sold in a category, or `None` if unregistered.
    #[must_use]
    pub fn sold(&self, category_id: CategoryId) -> Option<u32> {
        self.ledger.sold(category_id)
    }

    /// Fetches one ticket, enforcing ownership.
    ///
    /// Staff-level roles may read any ticket; attendees only their own.
    ///
    /// # Errors
    /// [`TicketingError::TicketNotFound`] or [`TicketingError::Forbidden`].
    pub fn ticket(
        &self,
        ticket_id: TicketId,
        requester: OwnerId,
        role: Role,
    ) -> Result<TicketSnapshot, TicketingError> {
        let ticket = self
            .tickets
            .get(&ticket_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(TicketingError::TicketNotFound { ticket_id })?;

        if ticket.owner() != requester && !role.is_staff() {
            return Err(TicketingError::Forbidden {
                message: format!("ticket {ticket_id} belongs to another attendee"),
            });
        }
        Ok(ticket.snapshot())
    }

    /// All tickets owned by a purchaser, in purchase order.
    #[must_use]
    pub fn tickets_for_owner(&self, owner: OwnerId) -> Vec<TicketSnapshot> {
        let ids = match self.owner_index.get(&owner) {
            Some(entry) => entry.value().clone(),
            None => return Vec::new(),
        };
        ids.iter()
            .filter_map(|id| self.tickets.get(id).map(|t| t.snapshot()))
            .collect()
    }

    /// Total number of tickets ever materialized (including cancelled).
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    /// Stores a freshly materialized ticket in all indexes.
    pub(super) fn track_ticket(&self, ticket: Arc<Ticket>) {
        self.tokens
            .insert(ticket.qr_token().to_string(), ticket.id());
        self.owner_index
            .entry(ticket.owner())
            .or_default()
            .push(ticket.id());
        self.tickets.insert(ticket.id(), ticket);
    }

    /// Resolves a QR token to its ticket, if the token was ever issued.
    pub(super) fn resolve_token(&self, qr_token: &str) -> Option<Arc<Ticket>> {
        let ticket_id = *self.tokens.get(qr_token)?.value();
        self.tickets
            .get(&ticket_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}
