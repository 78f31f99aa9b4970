use thiserror::Error;

use crate::{
    db_types::{Member, NewOrder, NewSubscription, Order, OrderStatusType, Product, ReceiptNumber, Subscription},
    traits::GatewayError,
};

#[derive(Debug, Error)]
pub enum PaymentEngineError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No product in cart")]
    NoProductInCart,
    #[error("Member #{0} does not exist")]
    MemberNotFound(i64),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{0} has no line item. This is a data integrity bug")]
    OrderItemMissing(i64),
    #[error("Order #{0} has already reached a terminal state")]
    OrderAlreadyFinalized(i64),
    #[error("Receipt numbers can only be issued for paid orders (order #{0})")]
    OrderNotPaid(i64),
    #[error(transparent)]
    GatewayError(#[from] GatewayError),
}

impl From<sqlx::Error> for PaymentEngineError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Storage behaviour required by the checkout engine: order persistence with an exclusive
/// `Pending → terminal` transition, receipt numbering, subscription creation and the cart
/// upsert/clear pair.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database.
    fn url(&self) -> &str;

    async fn fetch_member(&self, member_id: i64) -> Result<Option<Member>, PaymentEngineError>;

    /// Resolves an opaque access token to a member. The authn boundary for the HTTP layer.
    async fn fetch_member_by_access_token(&self, token: &str) -> Result<Option<Member>, PaymentEngineError>;

    /// Persists the gateway's customer record id on the member so future checkouts reuse it.
    async fn save_gateway_customer_id(&self, member_id: i64, customer_id: &str) -> Result<(), PaymentEngineError>;

    /// The product currently in the member's cart, if any.
    async fn cart_product_for_member(&self, member_id: i64) -> Result<Option<Product>, PaymentEngineError>;

    /// Inserts a pending order together with its single line item, atomically.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentEngineError>;

    /// Records the gateway charge-session identifier on the order.
    async fn attach_charge_id(&self, order_id: i64, charge_id: &str) -> Result<Order, PaymentEngineError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, PaymentEngineError>;

    /// The product referenced by the order's line item.
    async fn product_for_order(&self, order_id: i64) -> Result<Product, PaymentEngineError>;

    /// Moves the order from `Pending` to the given terminal state, stamping `paid_at` when the
    /// new state is `Paid`. The update is a compare-and-set on the current status: if the order
    /// is no longer `Pending` the call fails with [`PaymentEngineError::OrderAlreadyFinalized`]
    /// and has no effect. This is the per-order exclusive-transition guard; two concurrent
    /// finalizations cannot both succeed.
    async fn finalize_order(&self, order_id: i64, new_status: OrderStatusType) -> Result<Order, PaymentEngineError>;

    async fn create_subscription(&self, subscription: NewSubscription) -> Result<Subscription, PaymentEngineError>;

    async fn subscription_for_order(&self, order_id: i64) -> Result<Option<Subscription>, PaymentEngineError>;

    /// Allocates the next receipt number for today and assigns it to the order. Idempotent: if the
    /// order already has a receipt number it is returned unchanged and the day sequence does not
    /// advance. Allocations are serialized through a per-day counter row, so concurrent calls on
    /// the same date can neither duplicate nor skip a number.
    async fn allocate_receipt_number(&self, order_id: i64) -> Result<ReceiptNumber, PaymentEngineError>;

    /// Stamps `receipt_sent_at` once the receipt email has been handed to the delivery worker.
    async fn mark_receipt_sent(&self, order_id: i64) -> Result<(), PaymentEngineError>;

    /// Restores a purchasable cart for the member: find-or-create the cart, overwrite its single
    /// item slot with the product. Idempotent upsert; never creates a second item.
    async fn recover_cart(&self, member_id: i64, product_id: i64) -> Result<(), PaymentEngineError>;

    /// Empties the member's cart. A no-op if the cart is already empty or absent.
    async fn clear_cart(&self, member_id: i64) -> Result<(), PaymentEngineError>;
}
