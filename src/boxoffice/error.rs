//! Ticketing engine error types.

use super::category::CategoryId;
use super::ticket::TicketId;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Errors that can occur within the box-office engine.
///
/// Business-rule rejections (quota, sale window, price mismatch) are
/// surfaced verbatim to the caller and must not be retried; they describe a
/// state of the world, not a transient fault.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TicketingError {
    /// Malformed or inconsistent request.
    Validation {
        /// Description of the problem.
        message: String,
    },

    /// No ticket category with this id is registered.
    CategoryNotFound {
        /// The unknown category id.
        category_id: CategoryId,
    },

    /// No ticket with this id exists.
    TicketNotFound {
        /// The unknown ticket id.
        ticket_id: TicketId,
    },

    /// The category has fewer units left than requested.
    QuotaExceeded {
        /// The category that ran out.
        category_id: CategoryId,
        /// Units requested.
        requested: u32,
        /// Units still available at the time of the attempt.
        available: u32,
    },

    /// The purchaser already holds too many tickets in this category.
    PerUserLimitExceeded {
        /// The category whose cap was hit.
        category_id: CategoryId,
        /// Maximum units one purchaser may hold.
        limit: u32,
        /// Units the purchaser already holds.
        held: u32,
        /// Units requested on top.
        requested: u32,
    },

    /// The category is inactive or outside its sale window.
    SaleWindowClosed {
        /// The category that is not on sale.
        category_id: CategoryId,
    },

    /// The cart sat idle past its expiry; a fresh quote is required.
    CartExpired,

    /// The amount authorized by the payment provider does not match the
    /// server-computed total (stale price or tampered request).
    PriceMismatch {
        /// Server-computed total.
        expected: Decimal,
        /// Amount the payment provider authorized.
        authorized: Decimal,
    },

    /// The payment provider refused the charge.
    PaymentDeclined {
        /// Provider-supplied reason.
        message: String,
    },

    /// The ticket was already scanned at the gate.
    TicketAlreadyUsed {
        /// The ticket in question.
        ticket_id: TicketId,
    },

    /// The ticket was cancelled and refunded.
    TicketCancelled {
        /// The ticket in question.
        ticket_id: TicketId,
    },

    /// The ticket never completed a purchase.
    TicketNotSold {
        /// The ticket in question.
        ticket_id: TicketId,
    },

    /// The festival has started; cancellation is no longer possible.
    FestivalStarted {
        /// The festival in question.
        festival_id: Uuid,
    },

    /// The caller may not access this resource.
    Forbidden {
        /// Description of the denied access.
        message: String,
    },

    /// The promo code does not exist for this festival.
    UnknownPromoCode {
        /// The code as submitted.
        code: String,
    },

    /// The cart subtotal is below the promo code's minimum purchase.
    PromoBelowMinimum {
        /// Minimum subtotal the code requires.
        min_purchase: Decimal,
        /// Current cart subtotal.
        subtotal: Decimal,
    },

    /// Error while serializing snapshot data.
    SerializationError {
        /// Underlying error message.
        message: String,
    },

    /// Error while deserializing snapshot data.
    DeserializationError {
        /// Underlying error message.
        message: String,
    },

    /// Snapshot integrity check failed.
    ChecksumMismatch {
        /// Expected checksum value.
        expected: String,
        /// Actual checksum value.
        actual: String,
    },

    /// Snapshot was produced by an incompatible format version.
    VersionMismatch {
        /// Format version this build understands.
        expected: u32,
        /// Format version found in the package.
        actual: u32,
    },
}

impl TicketingError {
    /// HTTP-equivalent status code for this error, for use by a routing
    /// layer translating engine results into responses.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            TicketingError::Validation { .. }
            | TicketingError::CartExpired
            | TicketingError::SaleWindowClosed { .. }
            | TicketingError::FestivalStarted { .. }
            | TicketingError::PromoBelowMinimum { .. } => 400,
            TicketingError::PaymentDeclined { .. } => 402,
            TicketingError::Forbidden { .. } => 403,
            TicketingError::CategoryNotFound { .. }
            | TicketingError::TicketNotFound { .. }
            | TicketingError::UnknownPromoCode { .. } => 404,
            TicketingError::QuotaExceeded { .. }
            | TicketingError::PerUserLimitExceeded { .. }
            | TicketingError::PriceMismatch { .. }
            | TicketingError::TicketAlreadyUsed { .. }
            | TicketingError::TicketCancelled { .. }
            | TicketingError::TicketNotSold { .. } => 409,
            TicketingError::SerializationError { .. }
            | TicketingError::DeserializationError { .. }
            | TicketingError::ChecksumMismatch { .. }
            | TicketingError::VersionMismatch { .. } => 500,
        }
    }
}

impl fmt::Display for TicketingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketingError::Validation { message } => write!(f, "validation error: {message}"),
            TicketingError::CategoryNotFound { category_id } => {
                write!(f, "category not found: {category_id}")
            }
            TicketingError::TicketNotFound { ticket_id } => {
                write!(f, "ticket not found: {ticket_id}")
            }
            TicketingError::QuotaExceeded {
                category_id,
                requested,
                available,
            } => {
                write!(
                    f,
                    "quota exceeded for category {category_id}: requested {requested}, available {available}"
                )
            }
            TicketingError::PerUserLimitExceeded {
                category_id,
                limit,
                held,
                requested,
            } => {
                write!(
                    f,
                    "per-user limit exceeded for category {category_id}: limit {limit}, already held {held}, requested {requested}"
                )
            }
            TicketingError::SaleWindowClosed { category_id } => {
                write!(f, "category {category_id} is not on sale")
            }
            TicketingError::CartExpired => write!(f, "cart expired, re-quote required"),
            TicketingError::PriceMismatch {
                expected,
                authorized,
            } => {
                write!(
                    f,
                    "price mismatch: server total {expected}, authorized {authorized}"
                )
            }
            TicketingError::PaymentDeclined { message } => {
                write!(f, "payment declined: {message}")
            }
            TicketingError::TicketAlreadyUsed { ticket_id } => {
                write!(f, "ticket {ticket_id} already used")
            }
            TicketingError::TicketCancelled { ticket_id } => {
                write!(f, "ticket {ticket_id} is cancelled")
            }
            TicketingError::TicketNotSold { ticket_id } => {
                write!(f, "ticket {ticket_id} was never sold")
            }
            TicketingError::FestivalStarted { festival_id } => {
                write!(f, "festival {festival_id} has started")
            }
            TicketingError::Forbidden { message } => write!(f, "forbidden: {message}"),
            TicketingError::UnknownPromoCode { code } => {
                write!(f, "unknown promo code: {code}")
            }
            TicketingError::PromoBelowMinimum {
                min_purchase,
                subtotal,
            } => {
                write!(
                    f,
                    "promo requires a minimum purchase of {min_purchase}, cart subtotal is {subtotal}"
                )
            }
            TicketingError::SerializationError { message } => {
                write!(f, "serialization error: {message}")
            }
            TicketingError::DeserializationError { message } => {
                write!(f, "deserialization error: {message}")
            }
            TicketingError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            TicketingError::VersionMismatch { expected, actual } => {
                write!(
                    f,
                    "snapshot format version mismatch: expected {expected}, found {actual}"
                )
            }
        }
    }
}

impl std::error::Error for TicketingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let category_id = CategoryId::new();
        let ticket_id = TicketId::new();

        assert_eq!(
            TicketingError::Validation {
                message: "bad".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(TicketingError::CartExpired.status_code(), 400);
        assert_eq!(
            TicketingError::Forbidden {
                message: "not yours".to_string()
            }
            .status_code(),
            403
        );
        assert_eq!(
            TicketingError::CategoryNotFound { category_id }.status_code(),
            404
        );
        assert_eq!(
            TicketingError::QuotaExceeded {
                category_id,
                requested: 2,
                available: 1
            }
            .status_code(),
            409
        );
        assert_eq!(
            TicketingError::TicketAlreadyUsed { ticket_id }.status_code(),
            409
        );
        assert_eq!(
            TicketingError::ChecksumMismatch {
                expected: "a".to_string(),
                actual: "b".to_string()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn test_display_quota_exceeded() {
        let err = TicketingError::QuotaExceeded {
            category_id: CategoryId::new(),
            requested: 3,
            available: 1,
        };
        let text = err.to_string();
        assert!(text.contains("requested 3"));
        assert!(text.contains("available 1"));
    }

    #[test]
    fn test_display_price_mismatch() {
        let err = TicketingError::PriceMismatch {
            expected: Decimal::new(9754, 2),
            authorized: Decimal::new(9000, 2),
        };
        assert_eq!(
            err.to_string(),
            "price mismatch: server total 97.54, authorized 90.00"
        );
    }
}
