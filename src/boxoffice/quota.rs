//! Quota ledger: bounded inventory allocation with conservation guarantees.
//!
//! The ledger owns the only mutable sold counters in the engine. Every
//! reservation is a single atomic read-modify-write against the category's
//! counter, so the invariant `0 <= sold <= quota` holds at every observable
//! point under any number of concurrent writers: two reservations whose
//! combined quantity exceeds the remaining capacity can never both succeed.

use super::category::{CategoryId, TicketCategory};
use super::error::TicketingError;
use super::ticket::OwnerId;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Per-category capacity and sold counter.
#[derive(Debug)]
struct QuotaCounter {
    /// Total sellable units; immutable for the lifetime of the entry.
    quota: u32,
    /// Units sold so far. Only mutated through `fetch_update`.
    sold: AtomicU32,
}

/// Units successfully reserved for one cart line.
///
/// An allocation must end in exactly one of [`QuotaLedger::commit`]
/// (purchase completed) or [`QuotaLedger::release`] (checkout unwound).
/// Both consume the value, so a committed allocation can never be rolled
/// back and a released one can never be committed.
#[derive(Debug)]
#[must_use = "an allocation must be committed or released"]
pub struct Allocation {
    category_id: CategoryId,
    owner: OwnerId,
    quantity: u32,
}

impl Allocation {
    /// The category the units were taken from.
    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// The purchaser the units are held for.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Number of units reserved.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Tracks capacity, sold counts, and per-purchaser holdings for every
/// registered category.
#[derive(Debug, Default)]
pub struct QuotaLedger {
    counters: DashMap<CategoryId, Arc<QuotaCounter>>,
    /// Units each purchaser currently holds per category, for the
    /// `max_per_user` cap. Kept in step with the sold counters.
    per_user: DashMap<(OwnerId, CategoryId), Arc<AtomicU32>>,
}

impl QuotaLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category's capacity with the ledger.
    ///
    /// # Errors
    /// Returns [`TicketingError::Validation`] if the category is already
    /// registered; capacities are immutable once set.
    pub fn register(&self, category: &TicketCategory) -> Result<(), TicketingError> {
        use dashmap::mapref::entry::Entry;

        match self.counters.entry(category.id) {
            Entry::Occupied(_) => Err(TicketingError::Validation {
                message: format!("category {} already registered", category.id),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(QuotaCounter {
                    quota: category.quota,
                    sold: AtomicU32::new(0),
                }));
                Ok(())
            }
        }
    }

    /// Atomically reserves `quantity` units of a category for `owner`.
    ///
    /// Checks, in order: the category is on sale at `now`; the purchaser's
    /// `max_per_user` headroom; the remaining capacity. The capacity check
    /// and the sold-count increment are one atomic operation, never a
    /// separate read and write, so concurrent callers cannot jointly
    /// oversell. A failed capacity check undoes the per-user bump taken
    /// just before it.
    ///
    /// # Errors
    /// [`TicketingError::SaleWindowClosed`], [`TicketingError::PerUserLimitExceeded`],
    /// [`TicketingError::QuotaExceeded`], [`TicketingError::CategoryNotFound`],
    /// or [`TicketingError::Validation`] for a zero quantity.
    pub fn reserve(
        &self,
        category: &TicketCategory,
        owner: OwnerId,
        quantity: u32,
        now: u64,
    ) -> Result<Allocation, TicketingError> {
        if quantity == 0 {
            return Err(TicketingError::Validation {
                message: "cannot reserve zero units".to_string(),
            });
        }
        if !category.is_on_sale(now) {
            return Err(TicketingError::SaleWindowClosed {
                category_id: category.id,
            });
        }

        let counter = self
            .counters
            .get(&category.id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(TicketingError::CategoryNotFound {
                category_id: category.id,
            })?;

        let held = self.user_counter(owner, category.id);
        let limit = category.max_per_user;
        held.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            current
                .checked_add(quantity)
                .filter(|&next| next <= limit)
        })
        .map_err(|current| TicketingError::PerUserLimitExceeded {
            category_id: category.id,
            limit,
            held: current,
            requested: quantity,
        })?;

        match counter.sold.fetch_update(Ordering::AcqRel, Ordering::Acquire, |sold| {
            sold.checked_add(quantity).filter(|&next| next <= counter.quota)
        }) {
            Ok(previous) => {
                trace!(
                    "reserved {} of category {} for {} ({} -> {})",
                    quantity,
                    category.id,
                    owner,
                    previous,
                    previous + quantity
                );
                Ok(Allocation {
                    category_id: category.id,
                    owner,
                    quantity,
                })
            }
            Err(sold) => {
                // Undo the per-user bump taken above.
                held.fetch_sub(quantity, Ordering::AcqRel);
                Err(TicketingError::QuotaExceeded {
                    category_id: category.id,
                    requested: quantity,
                    available: counter.quota.saturating_sub(sold),
                })
            }
        }
    }

    /// Finalizes an allocation after a completed purchase.
    ///
    /// Consuming the allocation here makes later rollback of the same units
    /// impossible by construction; cancellations go through
    /// [`Self::release_units`] instead.
    pub fn commit(&self, allocation: Allocation) {
        trace!(
            "committed {} of category {} for {}",
            allocation.quantity,
            allocation.category_id,
            allocation.owner
        );
        let _ = allocation;
    }

    /// Returns an allocation's units to availability (checkout unwound).
    pub fn release(&self, allocation: Allocation) {
        self.release_units(allocation.category_id, allocation.owner, allocation.quantity);
    }

    /// Returns `quantity` units of a category to availability and restores
    /// the purchaser's per-user headroom. Counters never go below zero.
    pub fn release_units(&self, category_id: CategoryId, owner: OwnerId, quantity: u32) {
        if let Some(counter) = self.counters.get(&category_id) {
            let _ = counter.sold.fetch_update(Ordering::AcqRel, Ordering::Acquire, |sold| {
                Some(sold.saturating_sub(quantity))
            });
        }
        if let Some(held) = self.per_user.get(&(owner, category_id)) {
            let _ = held.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(quantity))
            });
        }
        trace!("released {} of category {}", quantity, category_id);
    }

    /// Units sold so far in a category, or `None` if unregistered.
    #[must_use]
    pub fn sold(&self, category_id: CategoryId) -> Option<u32> {
        self.counters
            .get(&category_id)
            .map(|counter| counter.sold.load(Ordering::Acquire))
    }

    /// Units still available in a category, or `None` if unregistered.
    #[must_use]
    pub fn available(&self, category_id: CategoryId) -> Option<u32> {
        self.counters.get(&category_id).map(|counter| {
            counter
                .quota
                .saturating_sub(counter.sold.load(Ordering::Acquire))
        })
    }

    /// Units a purchaser currently holds in a category.
    #[must_use]
    pub fn held_by(&self, owner: OwnerId, category_id: CategoryId) -> u32 {
        self.per_user
            .get(&(owner, category_id))
            .map(|held| held.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Overwrites a category's sold counter (snapshot restore path).
    pub(super) fn set_sold(&self, category_id: CategoryId, sold: u32) {
        if let Some(counter) = self.counters.get(&category_id) {
            counter.sold.store(sold, Ordering::Release);
        }
    }

    /// Overwrites a purchaser's held counter (snapshot restore path).
    pub(super) fn set_held(&self, owner: OwnerId, category_id: CategoryId, held: u32) {
        self.user_counter(owner, category_id)
            .store(held, Ordering::Release);
    }

    fn user_counter(&self, owner: OwnerId, category_id: CategoryId) -> Arc<AtomicU32> {
        Arc::clone(
            self.per_user
                .entry((owner, category_id))
                .or_insert_with(|| Arc::new(AtomicU32::new(0)))
                .value(),
        )
    }
}
