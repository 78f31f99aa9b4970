use crate::db_types::{Order, Product, ReceiptNumber, Subscription};

/// Emitted once a paid order has its subscription and receipt number, i.e. everything an email
/// receipt needs. Consumers run outside the order transaction; a failed or slow consumer must
/// never affect the already-committed order.
#[derive(Debug, Clone)]
pub struct ReceiptReadyEvent {
    pub order: Order,
    pub product: Product,
    pub subscription: Subscription,
    pub receipt_number: ReceiptNumber,
    pub member_email: String,
}
