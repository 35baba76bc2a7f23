//! # Checkout Pricing & Ticket Inventory Engine
//!
//! A thread-safe checkout and ticket inventory engine for festival
//! ticketing platforms. The engine turns a mutable shopping cart into a
//! deterministic, auditable price and allocates a strictly bounded pool of
//! ticket inventory to purchasers: no overselling under concurrency,
//! at-most-once admission at the gate, and reversible cancellation.
//!
//! ## Key Features
//!
//! - **Conservation by construction**: Every quota reservation is a single
//!   atomic read-modify-write against the category's sold counter. Two
//!   reservations whose combined quantity exceeds the remaining capacity
//!   can never both succeed, so `0 <= sold <= quota` holds at every
//!   observable point under any number of concurrent writers.
//!
//! - **All-or-nothing checkout**: Reservations across a cart's line items
//!   either all commit or all unwind. Any failure after reservation
//!   (payment decline, price mismatch, missing category) releases every
//!   unit already taken. A checkout never partially purchases.
//!
//! - **Deterministic pricing**: A cart's price is a pure function of its
//!   items and promo code. Subtotal, discount, service fee, and processing
//!   fee are recomputed on every read and never cached, so displayed
//!   prices cannot drift from their inputs. The checkout re-prices
//!   server-side and never trusts client-submitted totals.
//!
//! - **At-most-once admission**: A ticket's lifecycle (SOLD → USED, or
//!   SOLD → CANCELLED) lives in an atomic cell; every transition is one
//!   compare-and-set. Of two simultaneous scans of the same QR token,
//!   exactly one admits; the other observes USED and is rejected with a
//!   reason gate staff can act on.
//!
//! - **Capability QR tokens**: Tokens are SHA-256 over a server secret,
//!   the ticket id, and a random nonce: opaque, unguessable, bound to
//!   exactly one ticket, and impossible to enumerate from ticket ids.
//!
//! - **Multi-festival management**: `FestivalManager` routes every
//!   engine's completed sales into one channel (std or Tokio mpsc) for
//!   downstream receipts and fulfilment.
//!
//! ## Design Goals
//!
//! 1. **Correctness**: Inventory and admission invariants hold under high
//!    concurrency; conflicting writes serialize on atomic operations, not
//!    on caller discipline.
//! 2. **Auditability**: Every completed sale carries the full pricing
//!    breakdown it settled at and one snapshot per ticket sold.
//! 3. **Clean seams**: The payment provider and promo-rule storage are
//!    traits; persistence hands off through checksummed snapshots.
//!
//! ## Concurrency Model
//!
//! The engine is shared behind an `Arc`; request handlers call it
//! directly. The only server-side mutable shared state is the ledger's
//! sold counters and each ticket's status, and all mutation goes through
//! the atomic operations on those fields, so no caller can read-then-write
//! them across two calls. Cart mutation is session-local and needs no
//! cross-request ordering. A cart holds no inventory: its 15-minute expiry
//! only clears local state and never touches the ledger.
//!
//! ## Example
//!
//! ```
//! use boxoffice_rs::prelude::*;
//! use rust_decimal::Decimal;
//! use uuid::Uuid;
//!
//! struct AutoApprove;
//!
//! impl PaymentGateway for AutoApprove {
//!     fn confirm(
//!         &self,
//!         _purchaser: OwnerId,
//!         amount: Decimal,
//!         currency: Currency,
//!     ) -> Result<PaymentConfirmation, TicketingError> {
//!         Ok(PaymentConfirmation {
//!             payment_id: Uuid::new_v4(),
//!             amount,
//!             currency,
//!         })
//!     }
//! }
//!
//! let festival_id = Uuid::new_v4();
//! let engine = BoxOffice::new(festival_id, "Summer Fest", u64::MAX, b"gate-secret");
//!
//! let category = TicketCategory {
//!     id: CategoryId::new(),
//!     festival_id,
//!     name: "Weekend Pass".to_string(),
//!     kind: CategoryKind::GeneralAdmission,
//!     unit_price: Decimal::new(5000, 2),
//!     currency: Currency::Eur,
//!     quota: 500,
//!     max_per_user: 4,
//!     sale_start: 0,
//!     sale_end: u64::MAX,
//!     is_active: true,
//! };
//! engine.add_category(category.clone()).unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(&category, 2, 500, current_time_millis());
//!
//! let purchaser = OwnerId::new();
//! let sale = engine.checkout(&mut cart, purchaser, &AutoApprove).unwrap();
//! assert_eq!(sale.ticket_count(), 2);
//!
//! let outcome = engine.scan(&sale.tickets[0].qr_token, None);
//! assert!(outcome.admitted);
//! ```

pub mod boxoffice;

pub mod prelude;
mod utils;

pub use boxoffice::cart::{CART_TTL_MILLIS, Cart, CartItem, PromoCode, PromoRules};
pub use boxoffice::category::{CategoryId, CategoryKind, TicketCategory, Zone, ZoneAccess};
pub use boxoffice::manager::{FestivalManager, FestivalManagerStd, FestivalManagerTokio};
pub use boxoffice::money::{Currency, MINOR_UNIT_DECIMALS, round_minor};
pub use boxoffice::pricing::{Discount, PricingBreakdown};
pub use boxoffice::quota::{Allocation, QuotaLedger};
pub use boxoffice::sale::{
    PaymentConfirmation, PaymentGateway, SaleEvent, SaleListener, SaleResult,
};
pub use boxoffice::scanner::{ScanOutcome, ScanRejection};
pub use boxoffice::snapshot::{
    BOXOFFICE_SNAPSHOT_FORMAT_VERSION, BoxOfficeSnapshot, BoxOfficeSnapshotPackage, CategorySold,
};
pub use boxoffice::ticket::{
    OwnerId, Role, Ticket, TicketId, TicketSnapshot, TicketStatus, issue_qr_token,
};
pub use boxoffice::{BoxOffice, TicketingError};
pub use utils::current_time_millis;
