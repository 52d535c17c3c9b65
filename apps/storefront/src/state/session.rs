//! # Shopper Session
//!
//! Owns one shopper's cart and checkout flow for as long as they browse.
//!
//! ## Lifecycle
//! ```text
//! new(currency) ──► browse (cart ops, anonymous allowed)
//!                     │
//!                     ▼
//!                  sign_in(identity) ──► checkout steps ──► CheckoutService
//!                     │
//!                     ▼
//!                  sign_out() ──► back to anonymous; cart kept
//! ```

use serde::Serialize;
use tracing::debug;

use rentshelf_core::checkout::CheckoutResult;
use rentshelf_core::{
    AddOutcome, CartEvent, CartSnapshot, CartStore, CatalogItem, CheckoutFlow, CheckoutStep,
    CoreResult, Identity, ShippingDetails,
};

/// A shopper's cart, checkout progress and sign-in state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperSession {
    cart: CartStore,
    checkout: CheckoutFlow,
    identity: Option<Identity>,
}

impl ShopperSession {
    /// Creates an anonymous session charging in `currency`.
    pub fn new(currency: impl Into<String>) -> Self {
        ShopperSession {
            cart: CartStore::new(),
            checkout: CheckoutFlow::new(currency),
            identity: None,
        }
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    pub fn sign_in(&mut self, identity: Identity) {
        debug!(uid = %identity.uid, role = ?identity.role, "Shopper signed in");
        self.identity = Some(identity);
    }

    /// Signs out, abandoning any checkout in progress. The cart is kept.
    ///
    /// The identity is always cleared.
    ///
    /// ## Errors
    /// `CannotCancel` while an order is being finalized; the checkout step
    /// is then left as is.
    pub fn sign_out(&mut self) -> CheckoutResult<()> {
        if let Some(identity) = self.identity.take() {
            debug!(uid = %identity.uid, "Shopper signed out");
        }

        match self.checkout.step().clone() {
            step if step.is_terminal() => self.checkout.reset(),
            CheckoutStep::Payment { in_flight: true } => {
                self.checkout.abandon_payment()?;
                self.checkout.cancel()
            }
            _ => self.checkout.cancel(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn add_to_cart(&mut self, item: CatalogItem, rental_days: Option<i64>) -> CoreResult<AddOutcome> {
        self.cart.add_item(item, rental_days)
    }

    pub fn remove_from_cart(&mut self, item_id: &str) -> bool {
        self.cart.remove_item(item_id)
    }

    pub fn update_rental_days(&mut self, item_id: &str, days: i64) -> CoreResult<bool> {
        self.cart.update_rental_days(item_id, days)
    }

    pub fn cart_snapshot(&self) -> CoreResult<CartSnapshot> {
        self.cart.snapshot()
    }

    /// Notifications queued by cart operations, oldest first.
    pub fn notifications(&mut self) -> Vec<CartEvent> {
        self.cart.drain_events()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    pub fn checkout_step(&self) -> &CheckoutStep {
        self.checkout.step()
    }

    pub fn proceed_to_shipping(&mut self) -> CheckoutResult<()> {
        self.checkout
            .proceed_to_shipping(&self.cart, self.identity.as_ref())
    }

    pub fn submit_shipping(&mut self, details: ShippingDetails) -> CheckoutResult<()> {
        self.checkout.submit_shipping(details)
    }

    pub fn back(&mut self) -> CheckoutResult<()> {
        self.checkout.back()
    }

    pub fn cancel_checkout(&mut self) -> CheckoutResult<()> {
        self.checkout.cancel()
    }

    pub fn reset_checkout(&mut self) -> CheckoutResult<()> {
        self.checkout.reset()
    }

    /// Drops a capture that will never report back, so the shopper can
    /// retry or cancel.
    pub fn abandon_payment(&mut self) -> CheckoutResult<()> {
        self.checkout.abandon_payment()
    }

    /// Borrows the three parts at once for the checkout service.
    pub(crate) fn parts_mut(&mut self) -> (&mut CartStore, &mut CheckoutFlow, Option<&Identity>) {
        (&mut self.cart, &mut self.checkout, self.identity.as_ref())
    }
}
