use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::Product;

/// Find-or-create the member's cart and return its id. Members only ever have one cart row.
async fn cart_id_for_member(member_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query("INSERT INTO carts (member_id) VALUES ($1) ON CONFLICT (member_id) DO NOTHING")
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    let (id,): (i64,) =
        sqlx::query_as("SELECT id FROM carts WHERE member_id = $1").bind(member_id).fetch_one(conn).await?;
    Ok(id)
}

/// Overwrites the cart's single item slot with the given product. Creates the cart if the member
/// does not have one yet. Calling this twice with the same product is a no-op apart from the
/// `updated_at` stamp.
pub async fn upsert_cart_item(member_id: i64, product_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let cart_id = cart_id_for_member(member_id, &mut *conn).await?;
    sqlx::query(
        r#"INSERT INTO cart_items (cart_id, product_id) VALUES ($1, $2)
        ON CONFLICT (cart_id) DO UPDATE SET product_id = excluded.product_id, updated_at = CURRENT_TIMESTAMP"#,
    )
    .bind(cart_id)
    .bind(product_id)
    .execute(conn)
    .await?;
    trace!("🛒️ Cart #{cart_id} for member #{member_id} now holds product #{product_id}");
    Ok(())
}

pub async fn product_in_cart(member_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        r#"SELECT p.id, p.title, p.price, p.duration_days, p.auto_renew FROM products p
        JOIN cart_items ci ON ci.product_id = p.id
        JOIN carts c ON c.id = ci.cart_id
        WHERE c.member_id = $1"#,
    )
    .bind(member_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// Empties the member's cart. Returns the number of items removed (0 or 1).
pub async fn clear_cart(member_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE member_id = $1)")
        .bind(member_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
