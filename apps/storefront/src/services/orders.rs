//! # Order Service
//!
//! Order lifecycle over the `OrderStore` and `ProfileStore` ports.
//!
//! Every read and write takes the acting identity and checks it against the
//! guards in `rentshelf_core::order` before touching the store.
//!
//! | Operation              | Allowed actor                |
//! |------------------------|------------------------------|
//! | `create_order`         | (checkout only)              |
//! | `update_status`        | admin                        |
//! | `get_by_id`            | owner or admin               |
//! | `list_by_shopper`      | that shopper or admin        |
//! | `list_all` / `search`  | admin                        |
//! | `downloadable_books`   | that shopper or admin        |
//! | `rentals`              | that shopper or admin        |

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use rentshelf_core::order::{
    authorize_admin_view, authorize_order_read, authorize_shopper_access,
    authorize_status_change, downloadable_books, DownloadableBook,
};
use rentshelf_core::ports::{OrderStore, ProfileStore};
use rentshelf_core::{
    CoreError, CoreResult, Identity, NewOrder, Order, OrderFilter, OrderStatus, Role,
    RETURN_WINDOW_DAYS,
};

/// Order operations. Cloning is cheap: clones share the stores.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    profiles: Arc<dyn ProfileStore>,
    return_window_days: i64,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        OrderService {
            orders,
            profiles,
            return_window_days: RETURN_WINDOW_DAYS,
        }
    }

    /// Overrides the default 30-day return window.
    pub fn with_return_window(mut self, days: i64) -> Self {
        self.return_window_days = days;
        self
    }

    /// Creates the order for a captured payment.
    ///
    /// The order and all of its books are stored in one atomic insert.
    /// Nothing is written when validation fails.
    pub async fn create_order(&self, new_order: NewOrder) -> CoreResult<Order> {
        let order = Order::place(new_order, Utc::now(), self.return_window_days)?;

        self.orders.insert(&order).await?;

        info!(
            order_id = %order.id,
            shopper_id = %order.shopper_id,
            books = order.books.len(),
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    /// Changes the status of an order. Admins only.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        actor: &Identity,
    ) -> CoreResult<Order> {
        if let Err(e) = authorize_status_change(actor) {
            warn!(uid = %actor.uid, order_id, "Rejected status change");
            return Err(e);
        }

        let order = self
            .orders
            .update_status(order_id, status, Utc::now())
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        info!(order_id, status = %status, by = %actor.uid, "Order status updated");
        Ok(order)
    }

    /// Reads one order as its owner or an admin.
    pub async fn get_by_id(&self, order_id: &str, actor: &Identity) -> CoreResult<Order> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        authorize_order_read(&order, actor)?;
        Ok(order)
    }

    /// A shopper's orders, newest first.
    pub async fn list_by_shopper(&self, shopper_id: &str, actor: &Identity) -> CoreResult<Vec<Order>> {
        authorize_shopper_access(shopper_id, actor)?;
        self.orders.list_by_shopper(shopper_id).await
    }

    /// Every order, newest first. Admins only.
    pub async fn list_all(&self, actor: &Identity) -> CoreResult<Vec<Order>> {
        authorize_admin_view(actor)?;
        self.orders.list_all().await
    }

    /// Admin order search by status tab and free text.
    pub async fn search(&self, filter: &OrderFilter, actor: &Identity) -> CoreResult<Vec<Order>> {
        let orders = self.list_all(actor).await?;
        let matched = filter.apply(orders);
        debug!(matches = matched.len(), "Order search");
        Ok(matched)
    }

    /// A shopper's rentals narrowed by status and search text.
    pub async fn rentals(
        &self,
        shopper_id: &str,
        filter: &OrderFilter,
        actor: &Identity,
    ) -> CoreResult<Vec<Order>> {
        let orders = self.list_by_shopper(shopper_id, actor).await?;
        Ok(filter.apply(orders))
    }

    /// Books from the shopper's delivered orders.
    pub async fn downloadable_books(
        &self,
        shopper_id: &str,
        actor: &Identity,
    ) -> CoreResult<Vec<DownloadableBook>> {
        let orders = self.list_by_shopper(shopper_id, actor).await?;
        Ok(downloadable_books(&orders))
    }

    /// Takes the role of an authenticated identity from its stored profile.
    /// Without a profile the identity acts as a shopper.
    pub async fn resolve_actor(&self, authenticated: Identity) -> CoreResult<Identity> {
        let role = match self.profiles.get_profile(&authenticated.uid).await? {
            Some(profile) => profile.role,
            None => {
                debug!(uid = %authenticated.uid, "No profile, treating as shopper");
                Role::Shopper
            }
        };

        Ok(Identity {
            role,
            ..authenticated
        })
    }
}
