//! `SqliteDatabase` is the concrete storage backend for the checkout engine.
//!
//! It implements [`PaymentGatewayDatabase`] and [`LibraryManagement`] on top of the low-level
//! functions in [`super::db`].
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::db::{carts, db_url, members, new_pool, newspapers, orders, receipts, subscriptions};
use crate::{
    db_types::{Member, NewOrder, NewSubscription, Newspaper, Order, OrderStatusType, Product, ReceiptNumber, Subscription},
    order_objects::{CatalogFilter, Pagination},
    traits::{LibraryApiError, LibraryManagement, PaymentEngineError, PaymentGatewayDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any embedded migrations that have not been run against this database yet.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        Ok(())
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_member(&self, member_id: i64) -> Result<Option<Member>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let member = members::member_by_id(member_id, &mut conn).await?;
        Ok(member)
    }

    async fn fetch_member_by_access_token(&self, token: &str) -> Result<Option<Member>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let member = members::member_by_access_token(token, &mut conn).await?;
        Ok(member)
    }

    async fn save_gateway_customer_id(&self, member_id: i64, customer_id: &str) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        members::set_gateway_customer_id(member_id, customer_id, &mut conn).await?;
        debug!("🗃️ Member #{member_id} is now linked to gateway customer {customer_id}");
        Ok(())
    }

    async fn cart_product_for_member(&self, member_id: i64) -> Result<Option<Product>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let product = carts::product_in_cart(member_id, &mut conn).await?;
        Ok(product)
    }

    /// The order row and its line item are written in a single transaction, so an order can never
    /// exist without its product reference.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentEngineError> {
        let mut tx = self.pool.begin().await?;
        let inserted = orders::insert_order(&order, &mut tx).await?;
        orders::insert_order_item(inserted.id, order.product_id, &mut tx).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn attach_charge_id(&self, order_id: i64, charge_id: &str) -> Result<Order, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::attach_charge_id(order_id, charge_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn product_for_order(&self, order_id: i64) -> Result<Product, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        orders::product_for_order(order_id, &mut conn).await
    }

    async fn finalize_order(&self, order_id: i64, new_status: OrderStatusType) -> Result<Order, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        match orders::finalize_order(order_id, new_status, &mut conn).await? {
            Some(order) => Ok(order),
            // The CAS missed. Work out which guard tripped.
            None => match orders::order_by_id(order_id, &mut conn).await? {
                Some(_) => Err(PaymentEngineError::OrderAlreadyFinalized(order_id)),
                None => Err(PaymentEngineError::OrderNotFound(order_id)),
            },
        }
    }

    async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let sub = subscriptions::insert_subscription(&subscription, &mut conn).await?;
        Ok(sub)
    }

    async fn subscription_for_order(&self, order_id: i64) -> Result<Option<Subscription>, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let sub = subscriptions::subscription_for_order(order_id, &mut conn).await?;
        Ok(sub)
    }

    async fn allocate_receipt_number(&self, order_id: i64) -> Result<ReceiptNumber, PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let today = Utc::now().date_naive();
        receipts::allocate_receipt_number(order_id, today, &mut conn).await
    }

    async fn mark_receipt_sent(&self, order_id: i64) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_receipt_sent(order_id, &mut conn).await?;
        Ok(())
    }

    async fn recover_cart(&self, member_id: i64, product_id: i64) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        carts::upsert_cart_item(member_id, product_id, &mut conn).await?;
        debug!("🛒️ Cart for member #{member_id} restored with product #{product_id}");
        Ok(())
    }

    async fn clear_cart(&self, member_id: i64) -> Result<(), PaymentEngineError> {
        let mut conn = self.pool.acquire().await?;
        let n = carts::clear_cart(member_id, &mut conn).await?;
        trace!("🛒️ Cleared {n} item(s) from member #{member_id}'s cart");
        Ok(())
    }
}

impl LibraryManagement for SqliteDatabase {
    async fn subscriptions_for_member(&self, member_id: i64) -> Result<Vec<Subscription>, LibraryApiError> {
        let mut conn = self.pool.acquire().await?;
        let subs = subscriptions::subscriptions_for_member(member_id, &mut conn).await?;
        Ok(subs)
    }

    async fn newspapers_for_member(
        &self,
        member_id: i64,
        filter: CatalogFilter,
        pagination: Pagination,
    ) -> Result<Vec<Newspaper>, LibraryApiError> {
        let mut conn = self.pool.acquire().await?;
        let papers = newspapers::newspapers_for_member(member_id, filter, pagination, &mut conn).await?;
        Ok(papers)
    }
}
