use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// The result of a `verify` call, i.e. what the user should be told when they return from the
/// gateway's authorization step.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    /// Payment captured, subscription provisioned, receipt issued, cart cleared.
    Completed { order: Order },
    /// The charge was declined, timed out, or reported unpaid. The order is cancelled and the
    /// cart has been restored so the member can retry.
    PaymentFailed { message: String },
    /// Payment was captured but the subscription could not be created. The order stays `Paid`;
    /// this needs manual reconciliation, never a silent loss of the payment.
    SubscriptionFailed { order: Order },
}

/// Month/year narrowing for the library listing. Absent fields leave that axis unfiltered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { offset: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn page(page: i64, per_page: i64) -> Self {
        let limit = per_page.max(1);
        let offset = (page.max(1) - 1) * limit;
        Self { offset, limit }
    }
}
