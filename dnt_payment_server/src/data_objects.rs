use dnt_payment_engine::order_objects::{CatalogFilter, Pagination, DEFAULT_PAGE_SIZE};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// One-time card token produced by the gateway's client-side tokenizer.
    pub payment_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl LibraryParams {
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter { month: self.month, year: self.year }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::page(self.page.unwrap_or(1), self.per_page.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}
