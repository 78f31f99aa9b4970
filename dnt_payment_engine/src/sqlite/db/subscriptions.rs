use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewSubscription, Subscription};

pub async fn insert_subscription(
    subscription: &NewSubscription,
    conn: &mut SqliteConnection,
) -> Result<Subscription, sqlx::Error> {
    let sub: Subscription = sqlx::query_as(
        r#"INSERT INTO subscriptions (member_id, order_id, start_date, end_date, auto_renew)
        VALUES ($1, $2, $3, $4, $5) RETURNING *"#,
    )
    .bind(subscription.member_id)
    .bind(subscription.order_id)
    .bind(subscription.start_date)
    .bind(subscription.end_date)
    .bind(subscription.auto_renew)
    .fetch_one(conn)
    .await?;
    debug!(
        "🗃️ Subscription #{} for member #{} runs {} to {}",
        sub.id, sub.member_id, sub.start_date, sub.end_date
    );
    Ok(sub)
}

pub async fn subscription_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Subscription>, sqlx::Error> {
    let sub = sqlx::query_as("SELECT * FROM subscriptions WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(sub)
}

pub async fn subscriptions_for_member(
    member_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Subscription>, sqlx::Error> {
    let subs = sqlx::query_as("SELECT * FROM subscriptions WHERE member_id = $1 ORDER BY start_date")
        .bind(member_id)
        .fetch_all(conn)
        .await?;
    Ok(subs)
}
