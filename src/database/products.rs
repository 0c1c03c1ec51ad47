use sqlx::SqliteExecutor;

use crate::database::manager::DatabaseError;
use crate::database::models::{Product, ProductInput};

const COLUMNS: &str = "id, name, sku, price, brand";

pub async fn list<'e, E>(executor: E) -> Result<Vec<Product>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM products ORDER BY id");
    Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(executor).await?)
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Product>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM products WHERE id = ?1");
    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn find_by_sku<'e, E>(executor: E, sku: &str) -> Result<Option<Product>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM products WHERE sku = ?1");
    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(sku)
        .fetch_optional(executor)
        .await?)
}

pub async fn insert<'e, E>(executor: E, input: &ProductInput) -> Result<Product, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO products (name, sku, price, brand) VALUES (?1, ?2, ?3, ?4) RETURNING {COLUMNS}"
    );
    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.price)
        .bind(&input.brand)
        .fetch_one(executor)
        .await?)
}

/// Replace every writable field; `None` when no product has that id
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    input: &ProductInput,
) -> Result<Option<Product>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "UPDATE products SET name = ?1, sku = ?2, price = ?3, brand = ?4 WHERE id = ?5 RETURNING {COLUMNS}"
    );
    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(input.price)
        .bind(&input.brand)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// Returns whether a row was removed
pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
