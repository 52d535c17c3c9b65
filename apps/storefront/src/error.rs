//! # API Error Type
//!
//! Unified error type handed to the presentation layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Rentshelf                              │
//! │                                                                         │
//! │  CheckoutError ──┐                                                      │
//! │  CoreError ──────┼──► ApiError { code, message } ──► presentation       │
//! │  DbError ────────┤                                                      │
//! │  ConfigError ────┘                                                      │
//! │                                                                         │
//! │  Recoverable (re-prompt, keep entered data):                            │
//! │    VALIDATION_ERROR, CART_ERROR, PAYMENT_ERROR, AUTHENTICATION_REQUIRED │
//! │  Always surfaced, never swallowed:                                      │
//! │    UNAUTHORIZED, CONTACT_SUPPORT                                        │
//! │  Internal details logged, generic message returned:                     │
//! │    DATABASE_ERROR, INTERNAL                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use rentshelf_core::{CheckoutError, CoreError};
use rentshelf_db::DbError;

use crate::config::ConfigError;

/// Error returned from storefront operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONTACT_SUPPORT",
///   "message": "Payment pay_123 was received but the order could not be recorded. Please contact support."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Shopper must sign in first (401)
    AuthenticationRequired,

    /// Actor lacks permission (403)
    Unauthorized,

    /// Action does not apply to the current checkout step (409)
    InvalidState,

    /// Cart operation failed
    CartError,

    /// Payment capture failed or is already running
    PaymentError,

    /// Payment captured but the order was not recorded
    ContactSupport,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPricingInput { reason } => {
                tracing::error!(%reason, "Invalid pricing input reached the storefront");
                ApiError::internal("Something went wrong while pricing your cart")
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Unauthorized { action } => ApiError::new(
                ErrorCode::Unauthorized,
                format!("You are not allowed to {action}"),
            ),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::Persistence(e) => {
                tracing::error!(error = %e, "Persistence failure");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::AuthenticationRequired => {
                ApiError::new(ErrorCode::AuthenticationRequired, message)
            }
            CheckoutError::EmptyCart => ApiError::new(ErrorCode::CartError, message),
            CheckoutError::Validation(_) => ApiError::validation(message),
            CheckoutError::InvalidStep { .. } | CheckoutError::CannotCancel => {
                ApiError::new(ErrorCode::InvalidState, message)
            }
            CheckoutError::PaymentInProgress | CheckoutError::PaymentCaptureFailed { .. } => {
                ApiError::new(ErrorCode::PaymentError, message)
            }
            CheckoutError::OrderNotRecorded { payment_reference } => {
                tracing::error!(%payment_reference, "Surfacing contact-support failure");
                ApiError::new(ErrorCode::ContactSupport, message)
            }
            CheckoutError::Core(e) => ApiError::from(e),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for storefront operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rentshelf_core::ValidationError;

    #[test]
    fn test_checkout_errors_map_to_codes() {
        let cases = [
            (CheckoutError::AuthenticationRequired, ErrorCode::AuthenticationRequired),
            (CheckoutError::EmptyCart, ErrorCode::CartError),
            (
                CheckoutError::Validation(ValidationError::required("city")),
                ErrorCode::ValidationError,
            ),
            (CheckoutError::PaymentInProgress, ErrorCode::PaymentError),
            (
                CheckoutError::PaymentCaptureFailed {
                    reason: "declined".to_string(),
                },
                ErrorCode::PaymentError,
            ),
            (
                CheckoutError::OrderNotRecorded {
                    payment_reference: "pay_123".to_string(),
                },
                ErrorCode::ContactSupport,
            ),
            (CheckoutError::CannotCancel, ErrorCode::InvalidState),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code, code);
        }
    }

    #[test]
    fn test_core_errors_map_to_codes() {
        assert_eq!(
            ApiError::from(CoreError::unauthorized("update order status")).code,
            ErrorCode::Unauthorized
        );
        assert_eq!(
            ApiError::from(CoreError::OrderNotFound("o-1".to_string())).code,
            ErrorCode::NotFound
        );
        let pricing = ApiError::from(CoreError::pricing("rental days must be positive, got 0"));
        assert_eq!(pricing.code, ErrorCode::Internal);
        assert!(!pricing.message.contains("rental days"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(CheckoutError::OrderNotRecorded {
            payment_reference: "pay_123".to_string(),
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CONTACT_SUPPORT");
        assert!(json["message"].as_str().unwrap().contains("pay_123"));
    }
}
