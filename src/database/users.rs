use sqlx::SqliteExecutor;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "SELECT id, email, password, is_admin FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "SELECT id, email, password, is_admin FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?)
}

/// Insert a user; `password_hash` must already be hashed
pub async fn insert<'e, E>(
    executor: E,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<User, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, is_admin) VALUES (?1, ?2, ?3)
         RETURNING id, email, password, is_admin",
    )
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(executor)
    .await?)
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    email: &str,
    is_admin: bool,
) -> Result<Option<User>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, User>(
        "UPDATE users SET email = ?1, is_admin = ?2 WHERE id = ?3
         RETURNING id, email, password, is_admin",
    )
    .bind(email)
    .bind(is_admin)
    .bind(id)
    .fetch_optional(executor)
    .await?)
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Email addresses of every user currently flagged admin, ordered by id
pub async fn admin_emails<'e, E>(executor: E) -> Result<Vec<String>, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let emails: Vec<(String,)> =
        sqlx::query_as("SELECT email FROM users WHERE is_admin = ?1 ORDER BY id")
            .bind(true)
            .fetch_all(executor)
            .await?;
    Ok(emails.into_iter().map(|(email,)| email).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn admin_emails_only_lists_admins() {
        let db = testing::memory_database().await;
        insert(db.pool(), "admin@example.net", "hash", true).await.unwrap();
        insert(db.pool(), "user@example.net", "hash", false).await.unwrap();
        insert(db.pool(), "second-admin@example.net", "hash", true).await.unwrap();

        assert_eq!(
            admin_emails(db.pool()).await.unwrap(),
            vec!["admin@example.net".to_string(), "second-admin@example.net".to_string()]
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let db = testing::memory_database().await;
        let user = insert(db.pool(), "user@example.net", "hash", false).await.unwrap();

        let updated = update(db.pool(), user.id, "new@example.net", true).await.unwrap().unwrap();
        assert_eq!(updated.email, "new@example.net");
        assert!(updated.is_admin);
        assert!(update(db.pool(), 999, "x@example.net", false).await.unwrap().is_none());

        assert!(delete(db.pool(), user.id).await.unwrap());
        assert!(find_by_id(db.pool(), user.id).await.unwrap().is_none());
    }
}
