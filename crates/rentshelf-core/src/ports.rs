//! # Collaborator Ports
//!
//! Async traits for everything the core talks to but does not own:
//! order persistence, user profiles and the payment processor.
//!
//! ```text
//! ┌──────────────────┐        ┌──────────────────────────────────────────┐
//! │  rentshelf-core  │        │  Implementations                         │
//! │                  │        │                                          │
//! │  OrderStore   ◄──┼────────┼── rentshelf-db  (SQLite)                 │
//! │  ProfileStore ◄──┼────────┼── storefront::memory (in-process)        │
//! │  PaymentGateway ◄┼────────┼── payment processor adapter              │
//! └──────────────────┘        └──────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreResult;
use crate::money::Money;
use crate::order::{Order, OrderStatus};
use crate::types::UserProfile;

// =============================================================================
// Persistence
// =============================================================================

/// Create/read/update access to orders.
///
/// `insert` must be atomic: either the order and all of its books are
/// stored, or nothing is.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> CoreResult<()>;

    async fn get(&self, order_id: &str) -> CoreResult<Option<Order>>;

    /// Orders of one shopper, newest first.
    async fn list_by_shopper(&self, shopper_id: &str) -> CoreResult<Vec<Order>>;

    /// All orders, newest first.
    async fn list_all(&self) -> CoreResult<Vec<Order>>;

    /// Persists a status change and returns the updated order, or `None` when
    /// the id is unknown.
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Option<Order>>;
}

/// Read access to user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> CoreResult<Option<UserProfile>>;
}

// =============================================================================
// Payment
// =============================================================================

/// What the payment processor is asked to capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Money,
    pub currency: String,
    pub shopper_email: String,
    pub shopper_name: String,
}

/// Proof of a successful capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_reference: String,
}

impl PaymentReceipt {
    pub fn new(payment_reference: impl Into<String>) -> Self {
        PaymentReceipt {
            payment_reference: payment_reference.into(),
        }
    }
}

/// Why a capture did not succeed. Both cases allow a retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentFailure {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("payment dismissed by the shopper")]
    Dismissed,
}

/// The payment processor.
///
/// Waits as long as the processor does; no timeout is added here.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DecliningGateway;

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn capture(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, PaymentFailure> {
            Err(PaymentFailure::Declined("insufficient funds".to_string()))
        }
    }

    #[tokio::test]
    async fn test_gateway_as_trait_object() {
        let gateway: Box<dyn PaymentGateway> = Box::new(DecliningGateway);
        let request = PaymentRequest {
            amount: Money::from_major(41),
            currency: "USD".to_string(),
            shopper_email: "asha@example.com".to_string(),
            shopper_name: "Asha Rao".to_string(),
        };

        let err = gateway.capture(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "payment declined: insufficient funds");
        assert_eq!(PaymentFailure::Dismissed.to_string(), "payment dismissed by the shopper");
    }
}
