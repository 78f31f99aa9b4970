use sqlx::SqliteConnection;

use crate::db_types::Member;

const MEMBER_COLUMNS: &str = "id, email, gateway_customer_id, created_at";

pub async fn member_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Member>, sqlx::Error> {
    let member = sqlx::query_as(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(member)
}

/// Resolves an opaque access token to a member. The token itself is never loaded into a
/// [`Member`] record.
pub async fn member_by_access_token(token: &str, conn: &mut SqliteConnection) -> Result<Option<Member>, sqlx::Error> {
    let member = sqlx::query_as(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE access_token = $1"))
        .bind(token)
        .fetch_optional(conn)
        .await?;
    Ok(member)
}

pub async fn set_gateway_customer_id(
    member_id: i64,
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE members SET gateway_customer_id = $1 WHERE id = $2")
        .bind(customer_id)
        .bind(member_id)
        .execute(conn)
        .await?;
    Ok(())
}
