//! # SQLite database methods
//!
//! "Low-level" SQLite interactions for the checkout engine.
//!
//! All interactions are plain functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an
//! atomic transaction as the need arises and pass `&mut *tx` without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod carts;
pub mod members;
pub mod newspapers;
pub mod orders;
pub mod receipts;
pub mod subscriptions;

const SQLITE_DB_URL: &str = "sqlite://data/dnt_store.db";

pub fn db_url() -> String {
    let result = env::var("DNT_DATABASE_URL").unwrap_or_else(|_| {
        info!("DNT_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
