use thiserror::Error;

use crate::{
    db_types::{Newspaper, Subscription},
    order_objects::{CatalogFilter, Pagination},
};

#[derive(Debug, Error)]
pub enum LibraryApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LibraryApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Read-side queries for the member library. Entitlement is the union of the member's
/// subscription date ranges; it is never deduplicated or merged.
#[allow(async_fn_in_trait)]
pub trait LibraryManagement {
    async fn subscriptions_for_member(&self, member_id: i64) -> Result<Vec<Subscription>, LibraryApiError>;

    /// Newspapers whose publication date falls inside any of the member's subscription ranges,
    /// optionally narrowed by month/year, newest first.
    async fn newspapers_for_member(
        &self,
        member_id: i64,
        filter: CatalogFilter,
        pagination: Pagination,
    ) -> Result<Vec<Newspaper>, LibraryApiError>;
}
