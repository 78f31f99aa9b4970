use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::Newspaper,
    order_objects::{CatalogFilter, Pagination},
};

/// Issues the member is entitled to: every newspaper whose publication date falls inside any of
/// the member's subscription ranges (endpoints inclusive). Overlapping subscriptions do not
/// duplicate rows. Newest first.
pub async fn newspapers_for_member(
    member_id: i64,
    filter: CatalogFilter,
    pagination: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Newspaper>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"SELECT DISTINCT n.id, n.title, n.published_at FROM newspapers n
        JOIN subscriptions s ON n.published_at BETWEEN s.start_date AND s.end_date
        WHERE s.member_id = "#,
    );
    builder.push_bind(member_id);
    if let Some(year) = filter.year {
        builder.push(" AND strftime('%Y', n.published_at) = ");
        builder.push_bind(format!("{year:04}"));
    }
    if let Some(month) = filter.month {
        builder.push(" AND strftime('%m', n.published_at) = ");
        builder.push_bind(format!("{month:02}"));
    }
    builder.push(" ORDER BY n.published_at DESC LIMIT ");
    builder.push_bind(pagination.limit);
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset);
    let papers = builder.build_query_as::<Newspaper>().fetch_all(conn).await?;
    Ok(papers)
}
