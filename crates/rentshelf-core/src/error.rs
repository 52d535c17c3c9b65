//! # Error Types
//!
//! Domain-specific error types for rentshelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentshelf-core errors (this file)                                      │
//! │  ├── CoreError        - Pricing, authorization, persistence outcomes    │
//! │  └── ValidationError  - Missing or malformed order/shipping fields      │
//! │                                                                         │
//! │  checkout::CheckoutError - Step guards of the checkout state machine    │
//! │                                                                         │
//! │  rentshelf-db errors (separate crate)                                   │
//! │  └── DbError          - SQLite failures, folded into CoreError          │
//! │                                                                         │
//! │  storefront errors (app)                                                │
//! │  └── ApiError         - What the presentation layer sees (serialized)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Already in cart" is deliberately absent: a duplicate add is a normal
//! outcome ([`crate::cart::AddOutcome::AlreadyInCart`]), not a failure.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad numeric input reached the pricing engine.
    ///
    /// ## When This Occurs
    /// - Rental days of zero or below
    /// - A negative, NaN or infinite weekly rate from the catalog
    /// - An unknown ISO currency code passed to the formatter
    ///
    /// Always a programming error; never shown to shoppers as-is.
    #[error("Invalid pricing input: {reason}")]
    InvalidPricingInput { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The actor may not perform the operation.
    ///
    /// ## When This Occurs
    /// - A non-admin changes an order status
    /// - A shopper reads another shopper's order or order list
    #[error("Unauthorized: {action}")]
    Unauthorized { action: String },

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The persistence collaborator failed.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Creates an InvalidPricingInput error.
    pub fn pricing(reason: impl Into<String>) -> Self {
        CoreError::InvalidPricingInput {
            reason: reason.into(),
        }
    }

    /// Creates an Unauthorized error for the attempted action.
    pub fn unauthorized(action: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Recoverable: the shopper is re-prompted with the values they entered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Several required form fields are blank, in form order.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unknown status string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that must hold at least one entry is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::pricing("rental days must be positive, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid pricing input: rental days must be positive, got 0"
        );

        let err = CoreError::unauthorized("update order status");
        assert_eq!(err.to_string(), "Unauthorized: update order status");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("city").to_string(),
            "city is required"
        );
        let err = ValidationError::Empty {
            field: "books".to_string(),
        };
        assert_eq!(err.to_string(), "books must not be empty");

        let err = ValidationError::MissingFields {
            fields: vec!["city".to_string(), "state".to_string()],
        };
        assert_eq!(err.to_string(), "missing required fields: city, state");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("shopper_id").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
