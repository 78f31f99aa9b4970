use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType, Product},
    traits::PaymentEngineError,
};

/// Inserts the order row. The caller is responsible for inserting the line item (see
/// [`insert_order_item`]) in the same transaction.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let inserted: Order =
        sqlx::query_as("INSERT INTO orders (member_id, total, sub_total) VALUES ($1, $2, $3) RETURNING *")
            .bind(order.member_id)
            .bind(order.total)
            .bind(order.sub_total)
            .fetch_one(conn)
            .await?;
    debug!("🗃️ Order #{} created for member #{} ({})", inserted.id, inserted.member_id, inserted.total);
    Ok(inserted)
}

pub async fn insert_order_item(order_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, product_id) VALUES ($1, $2)")
        .bind(order_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn attach_charge_id(order_id: i64, charge_id: &str, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET charge_id = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(charge_id)
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Compare-and-set transition out of `Pending`. `paid_at` is stamped when, and only when, the new
/// status is `Paid`. Returns `None` when the order is not in `Pending` (or does not exist) — the
/// caller decides which of the two it was.
pub async fn finalize_order(
    order_id: i64,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        r#"UPDATE orders SET
            status = $1,
            updated_at = CURRENT_TIMESTAMP,
            paid_at = CASE WHEN $1 = 'Paid' THEN CURRENT_TIMESTAMP ELSE paid_at END
        WHERE id = $2 AND status = 'Pending'
        RETURNING *"#,
    )
    .bind(new_status.to_string())
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("🗃️ Order #{} moved to {}", o.id, o.status);
    }
    Ok(order)
}

/// The product behind the order's single line item.
pub async fn product_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Product, PaymentEngineError> {
    let product: Option<Product> = sqlx::query_as(
        r#"SELECT p.id, p.title, p.price, p.duration_days, p.auto_renew FROM products p
        JOIN order_items oi ON oi.product_id = p.id
        WHERE oi.order_id = $1"#,
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(PaymentEngineError::OrderItemMissing(order_id))
}

pub async fn mark_receipt_sent(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET receipt_sent_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}
