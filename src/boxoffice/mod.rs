//! Box-office engine: carts, quota accounting, checkout, tickets, and gate
//! scanning for one festival.

mod cancel;
/// Session-local shopping carts and the promo-rule seam.
pub mod cart;
/// Ticket categories, zones, and zone-access rights.
pub mod category;
mod checkout;
/// The core `BoxOffice` engine struct.
pub mod engine;
pub mod error;
/// Multi-festival management with centralized sale event routing.
pub mod manager;
/// Currency and minor-unit rounding.
pub mod money;
/// Pure pricing derivation: subtotal, discount, fees.
pub mod pricing;
/// Bounded inventory allocation with conservation guarantees.
pub mod quota;
/// Completed-sale results and the payment seam.
pub mod sale;
/// Gate scanning and admission outcomes.
pub mod scanner;
pub mod snapshot;
/// Tickets and their lifecycle state machine.
pub mod ticket;

#[cfg(test)]
mod tests;

pub use cart::{CART_TTL_MILLIS, Cart, CartItem, PromoCode, PromoRules};
pub use category::{CategoryId, CategoryKind, TicketCategory, Zone, ZoneAccess};
pub use engine::BoxOffice;
pub use error::TicketingError;
pub use manager::{FestivalManager, FestivalManagerStd, FestivalManagerTokio};
pub use money::{Currency, MINOR_UNIT_DECIMALS, round_minor};
pub use pricing::{Discount, PricingBreakdown};
pub use quota::{Allocation, QuotaLedger};
pub use sale::{PaymentConfirmation, PaymentGateway, SaleEvent, SaleListener, SaleResult};
pub use scanner::{ScanOutcome, ScanRejection};
pub use snapshot::{
    BOXOFFICE_SNAPSHOT_FORMAT_VERSION, BoxOfficeSnapshot, BoxOfficeSnapshotPackage, CategorySold,
};
pub use ticket::{
    OwnerId, Role, Ticket, TicketId, TicketSnapshot, TicketStatus, issue_qr_token,
};
