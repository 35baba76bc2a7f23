//! Prelude module that re-exports commonly used types and traits.
//!
//! This module provides a convenient way to import the most commonly used
//! types, traits, and functions from the boxoffice-rs crate. Instead of
//! importing each type individually, you can use:
//!
//! ```rust
//! use boxoffice_rs::prelude::*;
//! ```
//!
//! This will import all the essential types needed for working with the
//! engine.

// Core engine types
pub use crate::boxoffice::BoxOffice;
pub use crate::boxoffice::TicketingError;
pub use crate::boxoffice::manager::{FestivalManager, FestivalManagerStd, FestivalManagerTokio};

// Cart and pricing types
pub use crate::boxoffice::cart::{CART_TTL_MILLIS, Cart, CartItem, PromoCode, PromoRules};
pub use crate::boxoffice::pricing::{Discount, PricingBreakdown};

// Category and zone types
pub use crate::boxoffice::category::{CategoryId, CategoryKind, TicketCategory, Zone, ZoneAccess};

// Quota types
pub use crate::boxoffice::quota::{Allocation, QuotaLedger};

// Ticket types
pub use crate::boxoffice::ticket::{
    OwnerId, Role, Ticket, TicketId, TicketSnapshot, TicketStatus,
};

// Sale and payment types
pub use crate::boxoffice::sale::{
    PaymentConfirmation, PaymentGateway, SaleEvent, SaleListener, SaleResult,
};

// Scanner types
pub use crate::boxoffice::scanner::{ScanOutcome, ScanRejection};

// Snapshot types
pub use crate::boxoffice::snapshot::{BoxOfficeSnapshot, BoxOfficeSnapshotPackage};

// Money types
pub use crate::boxoffice::money::{Currency, round_minor};

// Utility functions
pub use crate::utils::current_time_millis;
