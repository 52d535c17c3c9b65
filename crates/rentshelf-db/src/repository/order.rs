//! # Order Repository
//!
//! Database operations for orders and their frozen book lines.
//!
//! ## Order Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Storage                                     │
//! │                                                                         │
//! │  1. INSERT (single transaction)                                         │
//! │     └── orders row                                                      │
//! │     └── order_books row × N   (position 0..N keeps cart order)          │
//! │     └── COMMIT, or nothing at all                                       │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── get_by_id / find_by_shopper / find_all (newest first)           │
//! │                                                                         │
//! │  3. STATUS CHANGE                                                       │
//! │     └── set_status() → status + updated_at, nothing else                │
//! │                                                                         │
//! │  Orders are never deleted.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use rentshelf_core::ports::OrderStore;
use rentshelf_core::{CoreResult, Money, Order, OrderStatus, PaymentStatus, RentedBook};

use super::parse_decimal;
use crate::error::DbResult;

const ORDER_COLUMNS: &str = r#"
    id, shopper_id, shopper_email, shopper_name,
    total_amount, status, delivery_address,
    payment_status, payment_reference,
    created_at, updated_at, return_due_date
"#;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    shopper_id: String,
    shopper_email: String,
    shopper_name: String,
    total_amount: String,
    status: OrderStatus,
    delivery_address: String,
    payment_status: PaymentStatus,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    return_due_date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    book_id: String,
    title: String,
    author: String,
    cover_image: String,
    price: String,
    rental_days: i64,
    total_price: String,
}

impl BookRow {
    fn into_book(self) -> DbResult<RentedBook> {
        Ok(RentedBook {
            price: Money::new(parse_decimal("price", &self.price)?),
            total_price: Money::new(parse_decimal("total_price", &self.total_price)?),
            book_id: self.book_id,
            title: self.title,
            author: self.author,
            cover_image: self.cover_image,
            rental_days: self.rental_days,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and all of its books in one transaction.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, books = order.books.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, shopper_id, shopper_email, shopper_name,
                total_amount, status, delivery_address,
                payment_status, payment_reference,
                created_at, updated_at, return_due_date
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.shopper_id)
        .bind(&order.shopper_email)
        .bind(&order.shopper_name)
        .bind(order.total_amount.amount().to_string())
        .bind(order.status)
        .bind(&order.delivery_address)
        .bind(order.payment_status)
        .bind(&order.payment_reference)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.return_due_date)
        .execute(&mut *tx)
        .await?;

        for (position, book) in order.books.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_books (
                    order_id, position, book_id, title, author,
                    cover_image, price, rental_days, total_price
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&book.book_id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.cover_image)
            .bind(book.price.amount().to_string())
            .bind(book.rental_days)
            .bind(book.total_price.amount().to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %order.id, shopper_id = %order.shopper_id, "Order stored");
        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Orders of one shopper, newest first.
    pub async fn find_by_shopper(&self, shopper_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE shopper_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(shopper_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(rows).await
    }

    /// Every order, newest first.
    pub async fn find_all(&self) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(rows).await
    }

    /// Sets the status and `updated_at` of an order.
    ///
    /// Returns the updated order, or `None` for an unknown id.
    pub async fn set_status(
        &self,
        id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> DbResult<Option<Order>> {
        debug!(id = %id, status = %status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Number of stored orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn books_for(&self, order_id: &str) -> DbResult<Vec<RentedBook>> {
        let rows: Vec<BookRow> = sqlx::query_as(
            r#"
            SELECT book_id, title, author, cover_image, price, rental_days, total_price
            FROM order_books
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookRow::into_book).collect()
    }

    async fn hydrate(&self, row: OrderRow) -> DbResult<Order> {
        let books = self.books_for(&row.id).await?;

        Ok(Order {
            total_amount: Money::new(parse_decimal("total_amount", &row.total_amount)?),
            id: row.id,
            shopper_id: row.shopper_id,
            shopper_email: row.shopper_email,
            shopper_name: row.shopper_name,
            books,
            status: row.status,
            delivery_address: row.delivery_address,
            payment_status: row.payment_status,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
            return_due_date: row.return_due_date,
        })
    }

    async fn hydrate_all(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }
}

// =============================================================================
// Port Implementation
// =============================================================================

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert(&self, order: &Order) -> CoreResult<()> {
        Ok(self.insert_order(order).await?)
    }

    async fn get(&self, order_id: &str) -> CoreResult<Option<Order>> {
        Ok(self.get_by_id(order_id).await?)
    }

    async fn list_by_shopper(&self, shopper_id: &str) -> CoreResult<Vec<Order>> {
        Ok(self.find_by_shopper(shopper_id).await?)
    }

    async fn list_all(&self) -> CoreResult<Vec<Order>> {
        Ok(self.find_all().await?)
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> CoreResult<Option<Order>> {
        Ok(self.set_status(order_id, status, updated_at).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use rentshelf_core::{CatalogItem, NewOrder, RETURN_WINDOW_DAYS};
    use rust_decimal_macros::dec;

    async fn repo() -> OrderRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().orders()
    }

    fn order_for(shopper_id: &str, created_at: DateTime<Utc>) -> Order {
        let dune = CatalogItem::new("b1", "Dune", Money::from_major(15)).with_authors(["Frank Herbert"]);
        let emma = CatalogItem::new("b2", "Emma", Money::from_major(10));
        let books = vec![
            RentedBook::snapshot(&dune, 30).unwrap(),
            RentedBook::snapshot(&emma, 14).unwrap(),
        ];
        let new_order = NewOrder {
            shopper_id: shopper_id.to_string(),
            shopper_email: format!("{shopper_id}@example.com"),
            shopper_name: "Asha Rao".to_string(),
            total_amount: books.iter().map(|b| b.total_price).sum(),
            books,
            delivery_address: "Asha Rao, 12 MG Road, Pune, MH 411001, India".to_string(),
            payment_reference: Some("pay_123".to_string()),
        };
        Order::place(new_order, created_at, RETURN_WINDOW_DAYS).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_full_precision() {
        let repo = repo().await;
        let order = order_for("u1", Utc::now());
        repo.insert_order(&order).await.unwrap();

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
        assert_eq!(stored.books[0].total_price.amount(), dec!(15) * dec!(30) / dec!(7));
        assert_eq!(stored.books[1].book_id, "b2");
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let repo = repo().await;
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_is_atomic() {
        let repo = repo().await;
        let mut order = order_for("u1", Utc::now());
        // Violates the rental_days CHECK on the second book row.
        order.books[1].rental_days = 0;

        assert!(repo.insert_order(&order).await.is_err());
        assert!(repo.get_by_id(&order.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = repo().await;
        let order = order_for("u1", Utc::now());
        repo.insert_order(&order).await.unwrap();

        let err = repo.insert_order(&order).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_shopper_newest_first() {
        let repo = repo().await;
        let now = Utc::now();
        let older = order_for("u1", now - Duration::days(2));
        let newer = order_for("u1", now);
        let foreign = order_for("u2", now);
        for order in [&older, &newer, &foreign] {
            repo.insert_order(order).await.unwrap();
        }

        let mine = repo.find_by_shopper("u1").await.unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec![newer.id.as_str(), older.id.as_str()]
        );
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = repo().await;
        let order = order_for("u1", Utc::now());
        repo.insert_order(&order).await.unwrap();

        let updated = repo
            .set_status(&order.id, OrderStatus::Delivered, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.books, order.books);

        let missing = repo
            .set_status("missing", OrderStatus::Delivered, Utc::now())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_port_maps_errors_to_core() {
        let repo = repo().await;
        let store: &dyn OrderStore = &repo;
        let order = order_for("u1", Utc::now());
        store.insert(&order).await.unwrap();

        let err = store.insert(&order).await.unwrap_err();
        assert!(matches!(err, rentshelf_core::CoreError::Persistence(_)));
        assert_eq!(store.list_by_shopper("u1").await.unwrap().len(), 1);
    }
}
