use crate::{
    db_types::{Newspaper, Subscription},
    order_objects::{CatalogFilter, Pagination},
    traits::{LibraryApiError, LibraryManagement},
};

/// Read-side API for the member library: which newspapers a member's subscriptions entitle them
/// to read.
#[derive(Debug, Clone)]
pub struct LibraryApi<B> {
    db: B,
}

impl<B> LibraryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> LibraryApi<B>
where B: LibraryManagement
{
    pub async fn subscriptions_for_member(&self, member_id: i64) -> Result<Vec<Subscription>, LibraryApiError> {
        self.db.subscriptions_for_member(member_id).await
    }

    /// The catalog the member is entitled to: newspapers published within any of their
    /// subscription ranges, newest first.
    pub async fn catalog_for_member(
        &self,
        member_id: i64,
        filter: CatalogFilter,
        pagination: Pagination,
    ) -> Result<Vec<Newspaper>, LibraryApiError> {
        self.db.newspapers_for_member(member_id, filter, pagination).await
    }
}
