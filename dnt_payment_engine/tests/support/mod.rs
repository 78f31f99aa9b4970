//! Shared helpers for the integration tests: a throwaway SQLite database per test, seed data, and
//! a mocked payment gateway.
#![allow(dead_code)]

use chrono::NaiveDate;
use dnt_common::Baht;
use dnt_payment_engine::{
    db_types::Order,
    traits::{AuthorizedCharge, CaptureResult, GatewayCustomer, GatewayError, PaymentGateway},
    SqliteDatabase,
};
use log::*;
use mockall::mock;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn prepare_customer<'a>(
            &self,
            existing_id: Option<&'a str>,
            email: &str,
            card_token: &str,
        ) -> Result<GatewayCustomer, GatewayError>;
        async fn authorize_charge(
            &self,
            amount: Baht,
            customer: &GatewayCustomer,
            return_url: &str,
        ) -> Result<AuthorizedCharge, GatewayError>;
        async fn capture_charge(&self, charge_id: &str) -> Result<CaptureResult, GatewayError>;
    }
}

pub fn random_db_path() -> String {
    format!("sqlite://../data/test_store_{}.db", rand::random::<u64>())
}

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await
}

async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

//--------------------------------------    Seed helpers    ----------------------------------------------------------
// All seeds run on an explicitly acquired connection. Writes issued through the pool executor are
// not guaranteed to be visible to a connection acquired later in the same test.

async fn acquire(db: &SqliteDatabase) -> sqlx::pool::PoolConnection<Sqlite> {
    db.pool().acquire().await.expect("Error acquiring seed connection")
}

pub async fn seed_member(db: &SqliteDatabase, email: &str) -> i64 {
    let token = format!("token-{}", rand::random::<u64>());
    let mut conn = acquire(db).await;
    let (id,): (i64,) = sqlx::query_as("INSERT INTO members (email, access_token) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind(token)
        .fetch_one(&mut *conn)
        .await
        .expect("Error seeding member");
    id
}

pub async fn set_gateway_customer(db: &SqliteDatabase, member_id: i64, customer_id: &str) {
    let mut conn = acquire(db).await;
    sqlx::query("UPDATE members SET gateway_customer_id = $1 WHERE id = $2")
        .bind(customer_id)
        .bind(member_id)
        .execute(&mut *conn)
        .await
        .expect("Error setting gateway customer id");
}

pub async fn seed_product(db: &SqliteDatabase, title: &str, price: Baht, duration_days: i64) -> i64 {
    let mut conn = acquire(db).await;
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO products (title, price, duration_days, auto_renew) VALUES ($1, $2, $3, FALSE) RETURNING id",
    )
    .bind(title)
    .bind(price)
    .bind(duration_days)
    .fetch_one(&mut *conn)
    .await
    .expect("Error seeding product");
    id
}

pub async fn fill_cart(db: &SqliteDatabase, member_id: i64, product_id: i64) {
    let mut conn = acquire(db).await;
    sqlx::query("INSERT INTO carts (member_id) VALUES ($1) ON CONFLICT (member_id) DO NOTHING")
        .bind(member_id)
        .execute(&mut *conn)
        .await
        .expect("Error seeding cart");
    sqlx::query(
        r#"INSERT INTO cart_items (cart_id, product_id)
        SELECT id, $2 FROM carts WHERE member_id = $1
        ON CONFLICT (cart_id) DO UPDATE SET product_id = excluded.product_id"#,
    )
    .bind(member_id)
    .bind(product_id)
    .execute(&mut *conn)
    .await
    .expect("Error seeding cart item");
}

pub async fn orders_for_member(db: &SqliteDatabase, member_id: i64) -> Vec<Order> {
    let mut conn = acquire(db).await;
    sqlx::query_as("SELECT * FROM orders WHERE member_id = $1 ORDER BY id")
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
        .expect("Error fetching orders")
}

async fn seed_order(db: &SqliteDatabase, member_id: i64, total: Baht, status: &str) -> i64 {
    let paid_at = if status == "Paid" { Some("now") } else { None };
    let mut conn = acquire(db).await;
    let (id,): (i64,) = sqlx::query_as(
        r#"INSERT INTO orders (member_id, total, sub_total, status, paid_at)
        VALUES ($1, $2, $3, $4, CASE WHEN $5 IS NULL THEN NULL ELSE CURRENT_TIMESTAMP END)
        RETURNING id"#,
    )
    .bind(member_id)
    .bind(total)
    .bind(total.subtotal_before_vat())
    .bind(status)
    .bind(paid_at)
    .fetch_one(&mut *conn)
    .await
    .expect("Error seeding order");
    id
}

pub async fn seed_order_item(db: &SqliteDatabase, order_id: i64, product_id: i64) {
    let mut conn = acquire(db).await;
    sqlx::query("INSERT INTO order_items (order_id, product_id) VALUES ($1, $2)")
        .bind(order_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await
        .expect("Error seeding order item");
}

pub async fn seed_paid_order(db: &SqliteDatabase, member_id: i64, total: Baht) -> i64 {
    seed_order(db, member_id, total, "Paid").await
}

pub async fn seed_pending_order(db: &SqliteDatabase, member_id: i64, total: Baht) -> i64 {
    seed_order(db, member_id, total, "Pending").await
}

/// Creates a subscription (with a backing paid order) covering the given inclusive range.
pub async fn seed_subscription(db: &SqliteDatabase, member_id: i64, start: NaiveDate, end: NaiveDate) -> i64 {
    let order_id = seed_paid_order(db, member_id, Baht::from(35000)).await;
    let mut conn = acquire(db).await;
    let (id,): (i64,) = sqlx::query_as(
        r#"INSERT INTO subscriptions (member_id, order_id, start_date, end_date, auto_renew)
        VALUES ($1, $2, $3, $4, FALSE) RETURNING id"#,
    )
    .bind(member_id)
    .bind(order_id)
    .bind(start)
    .bind(end)
    .fetch_one(&mut *conn)
    .await
    .expect("Error seeding subscription");
    id
}

pub async fn seed_newspaper(db: &SqliteDatabase, title: &str, published_at: NaiveDate) {
    let mut conn = acquire(db).await;
    sqlx::query("INSERT INTO newspapers (title, published_at) VALUES ($1, $2)")
        .bind(title)
        .bind(published_at)
        .execute(&mut *conn)
        .await
        .expect("Error seeding newspaper");
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}
