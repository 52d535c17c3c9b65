//! # Checkout Service
//!
//! Runs "Pay Now" for a session: capture, then persist, then clear the cart.
//!
//! ## Pay Now Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          place_order(session)                           │
//! │                                                                         │
//! │  1. flow.begin_payment ─────► Payment { in_flight: true }               │
//! │                                                                         │
//! │  2. gateway.capture ──┬─ Err ─► flow.payment_failed ─► retry allowed    │
//! │                       │                                                 │
//! │                       └─ Ok(receipt)                                    │
//! │                              │                                          │
//! │  3. flow.payment_succeeded ──► Finalizing { payment_reference }         │
//! │                              │                                          │
//! │  4. orders.create_order ──┬─ Err ─► error! + SupportRequired            │
//! │                           │         (cart kept, reference shown)        │
//! │                           └─ Ok(order)                                  │
//! │                                  │                                      │
//! │  5. flow.order_recorded ─────► Confirmed { order_id }                   │
//! │  6. cart.clear()                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancellation
//! If the `place_order` future is dropped mid-way (timeout, closed
//! connection, aborted task) the session is never left in flight:
//! - dropped during capture: back to `Payment`, retry or cancel allowed
//! - dropped after capture: `SupportRequired` with the payment reference

use std::sync::Arc;

use tracing::{error, info, warn};

use rentshelf_core::checkout::CheckoutResult;
use rentshelf_core::ports::PaymentGateway;
use rentshelf_core::{CheckoutError, CheckoutFlow, CheckoutStep, Order};

use crate::services::OrderService;
use crate::state::ShopperSession;

/// Drives payment capture and order creation for a session.
#[derive(Clone)]
pub struct CheckoutService {
    orders: OrderService,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(orders: OrderService, gateway: Arc<dyn PaymentGateway>) -> Self {
        CheckoutService { orders, gateway }
    }

    /// Captures payment for the session's cart and records the order.
    ///
    /// ## Errors
    /// - `PaymentInProgress` for a second call while a capture is running
    /// - `PaymentCaptureFailed` when the processor declines or the shopper
    ///   dismisses; the session stays on the payment step for a retry
    /// - `OrderNotRecorded` when the payment went through but the order
    ///   could not be stored; the cart is kept
    pub async fn place_order(&self, session: &mut ShopperSession) -> CheckoutResult<Order> {
        let (cart, flow, identity) = session.parts_mut();
        let identity = identity
            .cloned()
            .ok_or(CheckoutError::AuthenticationRequired)?;

        let mut guard = InFlightGuard { flow };
        let request = guard.flow.begin_payment(cart, &identity)?;
        info!(
            uid = %identity.uid,
            amount = %request.amount,
            currency = %request.currency,
            "Capturing payment"
        );

        let receipt = match self.gateway.capture(&request).await {
            Ok(receipt) => receipt,
            Err(failure) => {
                warn!(uid = %identity.uid, %failure, "Payment not captured");
                return Err(guard.flow.payment_failed(failure));
            }
        };

        let payment_reference = receipt.payment_reference.clone();
        let new_order = match guard.flow.payment_succeeded(receipt, cart, &identity) {
            Ok(new_order) => new_order,
            Err(e) => {
                error!(%payment_reference, error = %e, "Captured payment has no order request");
                return Err(e);
            }
        };

        match self.orders.create_order(new_order).await {
            Ok(order) => {
                guard.flow.order_recorded(order.id.clone())?;
                cart.clear();
                info!(order_id = %order.id, %payment_reference, "Checkout complete");
                Ok(order)
            }
            Err(e) => {
                error!(
                    %payment_reference,
                    uid = %identity.uid,
                    error = %e,
                    "Payment captured but order was not recorded"
                );
                Err(guard.flow.order_failed())
            }
        }
    }
}

/// Settles a checkout left unresolved when `place_order` is dropped.
struct InFlightGuard<'a> {
    flow: &'a mut CheckoutFlow,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        match self.flow.step().clone() {
            CheckoutStep::Payment { in_flight: true } => {
                warn!("Payment capture abandoned before it reported back");
                if let Err(e) = self.flow.abandon_payment() {
                    error!(error = %e, "Could not clear in-flight payment");
                }
            }
            CheckoutStep::Finalizing { .. } => {
                let err = self.flow.order_failed();
                error!(error = %err, "Order recording abandoned after capture");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rentshelf_core::ports::{
        OrderStore, PaymentFailure, PaymentReceipt, PaymentRequest,
    };
    use rentshelf_core::{
        CatalogItem, CheckoutStep, CoreError, CoreResult, Identity, Money, OrderStatus,
        PaymentStatus, ShippingDetails,
    };
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::memory::{ApprovingGateway, InMemoryOrderStore, InMemoryProfileStore};

    /// Counts inserts; optionally fails every one of them.
    struct CountingStore {
        inner: InMemoryOrderStore,
        inserts: AtomicUsize,
        fail: bool,
    }

    impl CountingStore {
        fn new(fail: bool) -> Self {
            CountingStore {
                inner: InMemoryOrderStore::new(),
                inserts: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl OrderStore for CountingStore {
        async fn insert(&self, order: &Order) -> CoreResult<()> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoreError::Persistence("disk full".to_string()));
            }
            self.inner.insert(order).await
        }

        async fn get(&self, order_id: &str) -> CoreResult<Option<Order>> {
            self.inner.get(order_id).await
        }

        async fn list_by_shopper(&self, shopper_id: &str) -> CoreResult<Vec<Order>> {
            self.inner.list_by_shopper(shopper_id).await
        }

        async fn list_all(&self) -> CoreResult<Vec<Order>> {
            self.inner.list_all().await
        }

        async fn update_status(
            &self,
            order_id: &str,
            status: OrderStatus,
            updated_at: DateTime<Utc>,
        ) -> CoreResult<Option<Order>> {
            self.inner.update_status(order_id, status, updated_at).await
        }
    }

    /// Declines the first capture, approves the rest.
    struct FlakyGateway {
        calls: AtomicUsize,
        seen: Mutex<Vec<PaymentRequest>>,
    }

    #[async_trait]
    impl PaymentGateway for FlakyGateway {
        async fn capture(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentFailure> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request.clone());
            }
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(PaymentFailure::Declined("insufficient funds".to_string())),
                _ => Ok(PaymentReceipt::new("pay_retry")),
            }
        }
    }

    fn service(store: Arc<dyn OrderStore>, gateway: Arc<dyn PaymentGateway>) -> CheckoutService {
        let orders = OrderService::new(store, Arc::new(InMemoryProfileStore::new()));
        CheckoutService::new(orders, gateway)
    }

    fn ready_session() -> ShopperSession {
        let mut session = ShopperSession::new("USD");
        session.sign_in(Identity::shopper("u1", "asha@example.com", "Asha"));
        session
            .add_to_cart(CatalogItem::new("b1", "Dune", Money::from_major(21)), Some(7))
            .unwrap();
        session
            .add_to_cart(CatalogItem::new("b2", "Emma", Money::from_major(10)), Some(14))
            .unwrap();
        session.proceed_to_shipping().unwrap();
        session
            .submit_shipping(ShippingDetails {
                full_name: "Asha Rao".to_string(),
                street_address: "12 MG Road".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                postal_code: "411001".to_string(),
                country: "India".to_string(),
            })
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_successful_payment_records_one_order() {
        let store = Arc::new(CountingStore::new(false));
        let checkout = service(store.clone(), Arc::new(ApprovingGateway::with_reference("pay_123")));
        let mut session = ready_session();

        let order = checkout.place_order(&mut session).await.unwrap();

        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(order.payment_reference.as_deref(), Some("pay_123"));
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Money::new(dec!(41)));
        assert_eq!(order.books.len(), 2);
        assert_eq!(
            order.delivery_address,
            "Asha Rao, 12 MG Road, Pune, MH 411001, India"
        );

        assert!(session.cart().is_empty());
        assert_eq!(
            session.checkout_step(),
            &CheckoutStep::Confirmed {
                order_id: order.id.clone()
            }
        );
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_persistence_keeps_cart_and_asks_for_support() {
        let store = Arc::new(CountingStore::new(true));
        let checkout = service(store.clone(), Arc::new(ApprovingGateway::with_reference("pay_123")));
        let mut session = ready_session();

        let err = checkout.place_order(&mut session).await.unwrap_err();

        assert!(matches!(
            &err,
            CheckoutError::OrderNotRecorded { payment_reference } if payment_reference == "pay_123"
        ));
        assert!(err.to_string().contains("pay_123"));
        assert_eq!(session.cart().len(), 2);
        assert_eq!(
            session.checkout_step(),
            &CheckoutStep::SupportRequired {
                payment_reference: "pay_123".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_declined_payment_can_be_retried() {
        let store = Arc::new(CountingStore::new(false));
        let gateway = Arc::new(FlakyGateway {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        });
        let checkout = service(store.clone(), gateway.clone());
        let mut session = ready_session();

        let err = checkout.place_order(&mut session).await.unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentCaptureFailed { .. }));
        assert_eq!(
            session.checkout_step(),
            &CheckoutStep::Payment { in_flight: false }
        );
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(session.cart().len(), 2);

        let order = checkout.place_order(&mut session).await.unwrap();
        assert_eq!(order.payment_reference.as_deref(), Some("pay_retry"));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].amount, Money::from_major(41));
        assert_eq!(seen[0].shopper_name, "Asha Rao");
        assert_eq!(seen[0].currency, "USD");
    }

    #[tokio::test]
    async fn test_place_order_outside_payment_step() {
        let checkout = service(
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(ApprovingGateway::with_reference("pay_123")),
        );
        let mut session = ShopperSession::new("USD");

        assert!(matches!(
            checkout.place_order(&mut session).await,
            Err(CheckoutError::AuthenticationRequired)
        ));

        session.sign_in(Identity::shopper("u1", "asha@example.com", "Asha"));
        assert!(matches!(
            checkout.place_order(&mut session).await,
            Err(CheckoutError::InvalidStep { .. })
        ));
    }

    /// Never answers the first capture; approves later ones.
    struct StalledGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentGateway for StalledGateway {
        async fn capture(&self, _request: &PaymentRequest) -> Result<PaymentReceipt, PaymentFailure> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(PaymentReceipt::new("pay_after_timeout"))
        }
    }

    /// Never finishes an insert.
    struct StalledStore;

    #[async_trait]
    impl OrderStore for StalledStore {
        async fn insert(&self, _order: &Order) -> CoreResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn get(&self, _order_id: &str) -> CoreResult<Option<Order>> {
            Ok(None)
        }

        async fn list_by_shopper(&self, _shopper_id: &str) -> CoreResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn list_all(&self) -> CoreResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn update_status(
            &self,
            _order_id: &str,
            _status: OrderStatus,
            _updated_at: DateTime<Utc>,
        ) -> CoreResult<Option<Order>> {
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_capture_leaves_session_usable() {
        let store = Arc::new(CountingStore::new(false));
        let gateway = Arc::new(StalledGateway {
            calls: AtomicUsize::new(0),
        });
        let checkout = service(store.clone(), gateway);
        let mut session = ready_session();

        let attempt = timeout(Duration::from_secs(30), checkout.place_order(&mut session)).await;
        assert!(attempt.is_err());
        assert_eq!(
            session.checkout_step(),
            &CheckoutStep::Payment { in_flight: false }
        );
        assert_eq!(session.cart().len(), 2);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);

        let order = checkout.place_order(&mut session).await.unwrap();
        assert_eq!(order.payment_reference.as_deref(), Some("pay_after_timeout"));
        assert!(session.cart().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_after_timed_out_capture() {
        let gateway = Arc::new(StalledGateway {
            calls: AtomicUsize::new(0),
        });
        let checkout = service(Arc::new(InMemoryOrderStore::new()), gateway);
        let mut session = ready_session();

        let attempt = timeout(Duration::from_secs(30), checkout.place_order(&mut session)).await;
        assert!(attempt.is_err());

        session.sign_out().unwrap();
        assert!(session.identity().is_none());
        assert_eq!(session.checkout_step(), &CheckoutStep::Cart);
        assert_eq!(session.cart().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_recording_asks_for_support() {
        let checkout = service(
            Arc::new(StalledStore),
            Arc::new(ApprovingGateway::with_reference("pay_123")),
        );
        let mut session = ready_session();

        let attempt = timeout(Duration::from_secs(30), checkout.place_order(&mut session)).await;
        assert!(attempt.is_err());
        assert_eq!(
            session.checkout_step(),
            &CheckoutStep::SupportRequired {
                payment_reference: "pay_123".to_string()
            }
        );
        assert_eq!(session.cart().len(), 2);

        session.reset_checkout().unwrap();
        assert_eq!(session.checkout_step(), &CheckoutStep::Cart);
    }
}
