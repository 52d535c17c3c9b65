//! # In-Memory Collaborators
//!
//! Process-local implementations of the ports, used when no database path
//! is configured and throughout the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use rentshelf_core::ports::{
    OrderStore, PaymentFailure, PaymentGateway, PaymentReceipt, PaymentRequest, ProfileStore,
};
use rentshelf_core::{CoreError, CoreResult, Order, OrderStatus, UserProfile};

// =============================================================================
// Orders
// =============================================================================

/// Orders kept newest first.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        InMemoryOrderStore::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> CoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(CoreError::Persistence(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(0, order.clone());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> CoreResult<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn list_by_shopper(&self, shopper_id: &str) -> CoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.is_owned_by(shopper_id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> CoreResult<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        Ok(orders.iter_mut().find(|o| o.id == order_id).map(|order| {
            order.set_status(status, updated_at);
            order.clone()
        }))
    }
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        InMemoryProfileStore::default()
    }

    /// Adds or replaces a profile.
    pub async fn insert(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.uid.clone(), profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, uid: &str) -> CoreResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Approves every capture. For demos and tests.
#[derive(Debug, Clone, Default)]
pub struct ApprovingGateway {
    reference: Option<String>,
}

impl ApprovingGateway {
    /// Issues a fresh `pay_<uuid>` reference per capture.
    pub fn new() -> Self {
        ApprovingGateway::default()
    }

    /// Always answers with `reference`.
    pub fn with_reference(reference: impl Into<String>) -> Self {
        ApprovingGateway {
            reference: Some(reference.into()),
        }
    }
}

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn capture(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, PaymentFailure> {
        let reference = self
            .reference
            .clone()
            .unwrap_or_else(|| format!("pay_{}", Uuid::new_v4().simple()));
        Ok(PaymentReceipt::new(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rentshelf_core::{CatalogItem, Money, NewOrder, RentedBook, RETURN_WINDOW_DAYS};

    fn order(shopper_id: &str, created_at: DateTime<Utc>) -> Order {
        let item = CatalogItem::new("b1", "Dune", Money::from_major(7));
        let request = NewOrder {
            shopper_id: shopper_id.to_string(),
            shopper_email: format!("{shopper_id}@example.com"),
            shopper_name: shopper_id.to_string(),
            books: vec![RentedBook::snapshot(&item, 7).unwrap()],
            total_amount: Money::from_major(7),
            delivery_address: "somewhere".to_string(),
            payment_reference: None,
        };
        Order::place(request, created_at, RETURN_WINDOW_DAYS).unwrap()
    }

    #[tokio::test]
    async fn test_orders_newest_first() {
        let store = InMemoryOrderStore::new();
        let now = Utc::now();
        let older = order("u1", now - Duration::hours(1));
        let newer = order("u1", now);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&order("u2", now)).await.unwrap();

        let listed = store.list_by_shopper("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(store.list_all().await.unwrap().len(), 3);

        assert!(store.insert(&older).await.is_err());
    }

    #[tokio::test]
    async fn test_update_unknown_order() {
        let store = InMemoryOrderStore::new();
        let result = store
            .update_status("missing", OrderStatus::Cancelled, Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_gateway_references() {
        let request = PaymentRequest {
            amount: Money::from_major(1),
            currency: "USD".to_string(),
            shopper_email: "a@example.com".to_string(),
            shopper_name: "A".to_string(),
        };

        let fixed = ApprovingGateway::with_reference("pay_123");
        assert_eq!(fixed.capture(&request).await.unwrap().payment_reference, "pay_123");

        let generated = ApprovingGateway::new().capture(&request).await.unwrap();
        assert!(generated.payment_reference.starts_with("pay_"));
    }
}
