//! Ticket categories: the sellable inventory classes of a festival.

use super::money::Currency;
use bitflags::bitflags;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a ticket category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Generates a fresh random category id.
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

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physically gated area of the festival grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// The main stage and general festival grounds.
    MainStage,
    /// The VIP lounge.
    VipLounge,
    /// Backstage areas.
    Backstage,
    /// The camping grounds.
    CampingGrounds,
}

impl Zone {
    /// The access flag a ticket must carry to enter this zone.
    #[must_use]
    pub fn required_access(&self) -> ZoneAccess {
        match self {
            Zone::MainStage => ZoneAccess::MAIN_STAGE,
            Zone::VipLounge => ZoneAccess::VIP_LOUNGE,
            Zone::Backstage => ZoneAccess::BACKSTAGE,
            Zone::CampingGrounds => ZoneAccess::CAMPING_GROUNDS,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::MainStage => write!(f, "main stage"),
            Zone::VipLounge => write!(f, "VIP lounge"),
            Zone::Backstage => write!(f, "backstage"),
            Zone::CampingGrounds => write!(f, "camping grounds"),
        }
    }
}

bitflags! {
    /// Zone-access rights carried by a ticket, derived from its category
    /// kind at purchase time.
    ///
    /// Multiple flags combine with bitwise OR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ZoneAccess: u32 {
        /// Access to the main stage and general grounds.
        const MAIN_STAGE = 1 << 0;

        /// Access to the VIP lounge.
        const VIP_LOUNGE = 1 << 1;

        /// Access to backstage areas.
        const BACKSTAGE = 1 << 2;

        /// Access to the camping grounds.
        const CAMPING_GROUNDS = 1 << 3;

        /// Access everywhere.
        const ALL = Self::MAIN_STAGE.bits() | Self::VIP_LOUNGE.bits()
                  | Self::BACKSTAGE.bits() | Self::CAMPING_GROUNDS.bits();
    }
}

/// The kind of a ticket category; determines zone access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Standard festival admission.
    GeneralAdmission,
    /// VIP admission with lounge access.
    Vip,
    /// All-areas access.
    Backstage,
    /// Admission plus camping grounds.
    Camping,
}

impl CategoryKind {
    /// The zone-access rights tickets of this kind grant.
    #[must_use]
    pub fn zone_access(&self) -> ZoneAccess {
        match self {
            CategoryKind::GeneralAdmission => ZoneAccess::MAIN_STAGE,
            CategoryKind::Vip => ZoneAccess::MAIN_STAGE | ZoneAccess::VIP_LOUNGE,
            CategoryKind::Backstage => ZoneAccess::ALL,
            CategoryKind::Camping => ZoneAccess::MAIN_STAGE | ZoneAccess::CAMPING_GROUNDS,
        }
    }
}

/// A sellable ticket category of one festival.
///
/// The category itself is an immutable value; the mutable sold count lives
/// in the quota ledger so that all writers go through its atomic
/// reserve/release operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketCategory {
    /// Unique identifier.
    pub id: CategoryId,
    /// The festival this category belongs to.
    pub festival_id: Uuid,
    /// Human-readable name, e.g. "Weekend Pass".
    pub name: String,
    /// Kind; determines zone access of sold tickets.
    pub kind: CategoryKind,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Currency of `unit_price`.
    pub currency: Currency,
    /// Total sellable units. Never shrinks below what was already sold.
    pub quota: u32,
    /// Maximum units a single purchaser may hold.
    pub max_per_user: u32,
    /// Start of the sale window, inclusive (epoch millis).
    pub sale_start: u64,
    /// End of the sale window, exclusive (epoch millis).
    pub sale_end: u64,
    /// Whether the category is currently offered at all.
    pub is_active: bool,
}

impl TicketCategory {
    /// True when the category can be purchased at `now`: active and inside
    /// the half-open sale window `[sale_start, sale_end)`.
    #[must_use]
    #[inline]
    pub fn is_on_sale(&self, now: u64) -> bool {
        self.is_active && self.sale_start <= now && now < self.sale_end
    }

    /// The zone-access rights a ticket of this category grants.
    #[must_use]
    #[inline]
    pub fn zone_access(&self) -> ZoneAccess {
        self.kind.zone_access()
    }
}
