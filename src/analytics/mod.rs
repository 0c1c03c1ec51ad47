//! Anonymous product view tracking
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqliteExecutor;

use crate::database::models::{ProductView, ProductViewCount};
use crate::database::DatabaseError;

/// Optional calendar filter for view counts
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ViewFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl ViewFilter {
    pub fn is_valid(&self) -> bool {
        self.month.map_or(true, |m| (1..=12).contains(&m))
    }
}

/// Append one anonymous view of `product_id`, stamped now (UTC)
pub async fn record_view<'e, E>(executor: E, product_id: i64) -> Result<ProductView, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    record_view_at(executor, product_id, Utc::now()).await
}

pub(crate) async fn record_view_at<'e, E>(
    executor: E,
    product_id: i64,
    view_date: DateTime<Utc>,
) -> Result<ProductView, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let view = sqlx::query_as::<_, ProductView>(
        "INSERT INTO product_analytics (product_id, view_date) VALUES (?1, ?2)
         RETURNING id, product_id, view_date",
    )
    .bind(product_id)
    .bind(view_date)
    .fetch_one(executor)
    .await?;

    tracing::debug!(product_id, view_id = view.id, "anonymous view recorded");
    Ok(view)
}

/// View counts grouped by product, optionally restricted to a year and/or month
pub async fn view_counts<'e, E>(
    executor: E,
    filter: ViewFilter,
) -> Result<Vec<ProductViewCount>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let year = filter.year.map(|y| format!("{y:04}"));
    let month = filter.month.map(|m| format!("{m:02}"));

    Ok(sqlx::query_as::<_, ProductViewCount>(
        r#"
        SELECT product_id, COUNT(*) AS count
        FROM product_analytics
        WHERE (?1 IS NULL OR strftime('%Y', view_date) = ?1)
          AND (?2 IS NULL OR strftime('%m', view_date) = ?2)
        GROUP BY product_id
        ORDER BY product_id
        "#,
    )
    .bind(year)
    .bind(month)
    .fetch_all(executor)
    .await?)
}

/// Count for a single product; zero when it was never viewed anonymously
pub async fn view_count<'e, E>(executor: E, product_id: i64) -> Result<ProductViewCount, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM product_analytics WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(executor)
            .await?;

    Ok(ProductViewCount { product_id, count })
}
