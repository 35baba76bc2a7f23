//! Engine snapshots for integrity-checked persistence handoff.

use super::category::{CategoryId, TicketCategory};
use super::engine::BoxOffice;
use super::error::TicketingError;
use super::ticket::{Ticket, TicketSnapshot, TicketStatus};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Format version used for checksum-enabled engine snapshots.
pub const BOXOFFICE_SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Sold count of one category at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySold {
    /// The category.
    pub category_id: CategoryId,
    /// Units sold at snapshot time.
    pub sold: u32,
}

/// A snapshot of one festival's engine state at a specific point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxOfficeSnapshot {
    /// The festival this engine sells for.
    pub festival_id: Uuid,

    /// Human-readable festival name.
    pub festival_name: String,

    /// Epoch millis of the festival's first day.
    pub festival_starts_at: u64,

    /// Timestamp when the snapshot was created (milliseconds since epoch).
    pub timestamp: u64,

    /// All registered categories.
    pub categories: Vec<TicketCategory>,

    /// Sold counters per category.
    pub sold: Vec<CategorySold>,

    /// Every materialized ticket.
    pub tickets: Vec<TicketSnapshot>,
}

/// Wrapper that provides checksum validation for [`BoxOfficeSnapshot`]
/// instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxOfficeSnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: BoxOfficeSnapshot,
    /// Hex-encoded checksum of the serialized snapshot.
    pub checksum: String,
}

impl BoxOfficeSnapshotPackage {
    /// Creates a new snapshot package, computing the checksum of the
    /// snapshot contents.
    pub fn new(snapshot: BoxOfficeSnapshot) -> Result<Self, TicketingError> {
        let checksum = Self::compute_checksum(&snapshot)?;

        Ok(Self {
            version: BOXOFFICE_SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, TicketingError> {
        serde_json::to_string(self).map_err(|error| TicketingError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserializes the package from JSON.
    pub fn from_json(data: &str) -> Result<Self, TicketingError> {
        serde_json::from_str(data).map_err(|error| TicketingError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validates the checksum and version.
    pub fn validate(&self) -> Result<(), TicketingError> {
        if self.version != BOXOFFICE_SNAPSHOT_FORMAT_VERSION {
            return Err(TicketingError::VersionMismatch {
                expected: BOXOFFICE_SNAPSHOT_FORMAT_VERSION,
                actual: self.version,
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(TicketingError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }

        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    pub fn into_snapshot(self) -> Result<BoxOfficeSnapshot, TicketingError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &BoxOfficeSnapshot) -> Result<String, TicketingError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| TicketingError::SerializationError {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);

        let checksum_bytes = hasher.finalize();
        Ok(format!("{:x}", checksum_bytes))
    }
}

impl BoxOffice {
    /// Captures the engine's full state: categories, sold counters, and
    /// every ticket.
    #[must_use]
    pub fn snapshot(&self) -> BoxOfficeSnapshot {
        let timestamp = crate::utils::current_time_millis();
        let categories: Vec<TicketCategory> = self
            .categories
            .iter()
            .map(|entry| (**entry.value()).clone())
            .collect();
        let sold = categories
            .iter()
            .map(|category| CategorySold {
                category_id: category.id,
                sold: self.ledger.sold(category.id).unwrap_or(0),
            })
            .collect();
        let tickets = self
            .tickets
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();

        BoxOfficeSnapshot {
            festival_id: self.festival_id,
            festival_name: self.festival_name.clone(),
            festival_starts_at: self.festival_starts_at,
            timestamp,
            categories,
            sold,
            tickets,
        }
    }

    /// Rebuilds an engine from a snapshot.
    ///
    /// Restores categories, sold counters, every ticket, and the token and
    /// owner indexes. Per-purchaser counters are recomputed from the SOLD
    /// tickets so `max_per_user` keeps holding after a restore.
    ///
    /// # Errors
    /// [`TicketingError::DeserializationError`] when the snapshot is
    /// internally inconsistent (a sold count without its category, or a
    /// sold count above the category's quota).
    pub fn restore(snapshot: &BoxOfficeSnapshot, qr_secret: &[u8]) -> Result<Self, TicketingError> {
        let engine = BoxOffice::new(
            snapshot.festival_id,
            &snapshot.festival_name,
            snapshot.festival_starts_at,
            qr_secret,
        );

        let quotas: HashMap<CategoryId, u32> = snapshot
            .categories
            .iter()
            .map(|category| (category.id, category.quota))
            .collect();

        for category in &snapshot.categories {
            engine.add_category(category.clone())?;
        }

        for entry in &snapshot.sold {
            let quota = quotas.get(&entry.category_id).copied().ok_or_else(|| {
                TicketingError::DeserializationError {
                    message: format!(
                        "sold count references unknown category {}",
                        entry.category_id
                    ),
                }
            })?;
            if entry.sold > quota {
                return Err(TicketingError::DeserializationError {
                    message: format!(
                        "category {} has sold {} above quota {}",
                        entry.category_id, entry.sold, quota
                    ),
                });
            }
            engine.ledger.set_sold(entry.category_id, entry.sold);
        }

        let mut held: HashMap<(super::ticket::OwnerId, CategoryId), u32> = HashMap::new();
        for ticket in &snapshot.tickets {
            if ticket.status == TicketStatus::Sold || ticket.status == TicketStatus::Used {
                *held.entry((ticket.owner, ticket.category_id)).or_insert(0) += 1;
            }
            engine.track_ticket(Arc::new(Ticket::from_snapshot(ticket)));
        }
        for ((owner, category_id), count) in held {
            engine.ledger.set_held(owner, category_id, count);
        }

        Ok(engine)
    }
}
