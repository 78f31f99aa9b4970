use chrono::NaiveDate;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderStatusType, ReceiptNumber},
    traits::PaymentEngineError,
};

/// Advances the per-day counter row and returns the new sequence value. The first allocation on a
/// date returns 1. The upsert is a single statement, so concurrent connections serialize on the
/// row and always get distinct values.
async fn next_sequence(date: NaiveDate, conn: &mut SqliteConnection) -> Result<u32, sqlx::Error> {
    let (seq,): (i64,) = sqlx::query_as(
        r#"INSERT INTO receipt_counters (receipt_date, last_seq) VALUES ($1, 1)
        ON CONFLICT (receipt_date) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq"#,
    )
    .bind(date.format("%Y%m%d").to_string())
    .fetch_one(conn)
    .await?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(seq as u32)
}

/// Issues a receipt number for the order, dated `today`. Only `Paid` orders qualify. If the order
/// already carries a number the existing one is returned and the day counter does not move, so
/// replays never burn sequence values.
///
/// Duplicates are impossible: the counter upsert is atomic and the order update only lands on a
/// still-unnumbered row. If another allocation for the same order slipped in between, its number
/// is read back and returned instead.
pub async fn allocate_receipt_number(
    order_id: i64,
    today: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<ReceiptNumber, PaymentEngineError> {
    let order = fetch_order(order_id, &mut *conn).await?;
    if let Some(number) = order.receipt_number {
        debug!("📝️ Order #{order_id} already has receipt {number}. Not allocating a new one");
        return Ok(number);
    }
    if order.status != OrderStatusType::Paid {
        return Err(PaymentEngineError::OrderNotPaid(order_id));
    }
    let seq = next_sequence(today, &mut *conn).await?;
    let number = ReceiptNumber::new(today, seq);
    let res = sqlx::query(
        "UPDATE orders SET receipt_number = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND receipt_number IS \
         NULL",
    )
    .bind(&number)
    .bind(order_id)
    .execute(&mut *conn)
    .await?;
    if res.rows_affected() == 0 {
        // Lost the race to a concurrent allocation for this order.
        let order = fetch_order(order_id, conn).await?;
        return order.receipt_number.ok_or(PaymentEngineError::OrderNotPaid(order_id));
    }
    debug!("📝️ Receipt {number} issued for order #{order_id}");
    Ok(number)
}

async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Order, PaymentEngineError> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    order.ok_or(PaymentEngineError::OrderNotFound(order_id))
}
