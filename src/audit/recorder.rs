use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::SqliteExecutor;

use super::AuditError;
use crate::database::models::{AuditAction, AuditEntry};

/// One product mutation waiting to be written to the audit log
#[derive(Debug, Clone, PartialEq)]
pub struct AuditChange {
    pub product_id: i64,
    pub action: AuditAction,
    pub previous: Option<Value>,
    pub new: Option<Value>,
    pub changed_by: i64,
}

impl AuditChange {
    /// Build a change, rejecting snapshot combinations that don't fit `action`
    pub fn new(
        product_id: i64,
        action: AuditAction,
        previous: Option<Value>,
        new: Option<Value>,
        changed_by: i64,
    ) -> Result<Self, AuditError> {
        let change = Self {
            product_id,
            action,
            previous,
            new,
            changed_by,
        };
        change.validate()?;
        Ok(change)
    }

    pub fn added(product_id: i64, new: Value, changed_by: i64) -> Self {
        Self {
            product_id,
            action: AuditAction::Added,
            previous: None,
            new: Some(new),
            changed_by,
        }
    }

    pub fn updated(product_id: i64, previous: Value, new: Value, changed_by: i64) -> Self {
        Self {
            product_id,
            action: AuditAction::Updated,
            previous: Some(previous),
            new: Some(new),
            changed_by,
        }
    }

    pub fn deleted(product_id: i64, previous: Value, changed_by: i64) -> Self {
        Self {
            product_id,
            action: AuditAction::Deleted,
            previous: Some(previous),
            new: None,
            changed_by,
        }
    }

    /// Added carries only a new snapshot, Deleted only a previous one, Updated both.
    pub fn validate(&self) -> Result<(), AuditError> {
        let expected = match self.action {
            AuditAction::Added => (false, true),
            AuditAction::Updated => (true, true),
            AuditAction::Deleted => (true, false),
        };
        let actual = (self.previous.is_some(), self.new.is_some());

        if actual == expected {
            return Ok(());
        }

        let describe = |present: bool| if present { "present" } else { "absent" };
        Err(AuditError::Validation(format!(
            "{} entry requires previous snapshot {} and new snapshot {}",
            self.action,
            describe(expected.0),
            describe(expected.1),
        )))
    }
}

/// Serialize a value into the snapshot stored on an audit entry
pub fn snapshot<T: Serialize>(value: &T) -> Result<Value, AuditError> {
    Ok(serde_json::to_value(value)?)
}

/// Append `change` to the audit log, timestamped now (UTC).
///
/// Pass a transaction as `executor` to make the entry commit or roll back
/// together with the mutation it describes.
pub async fn record<'e, E>(executor: E, change: &AuditChange) -> Result<AuditEntry, AuditError>
where
    E: SqliteExecutor<'e>,
{
    record_at(executor, change, Utc::now()).await
}

pub(crate) async fn record_at<'e, E>(
    executor: E,
    change: &AuditChange,
    timestamp: DateTime<Utc>,
) -> Result<AuditEntry, AuditError>
where
    E: SqliteExecutor<'e>,
{
    change.validate()?;

    let previous = change.previous.as_ref().map(Value::to_string);
    let new = change.new.as_ref().map(Value::to_string);

    let entry = sqlx::query_as::<_, AuditEntry>(
        r#"
        INSERT INTO audit_log (product_id, action, previous_data, new_data, changed_by, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING id, product_id, action, previous_data, new_data, changed_by, timestamp
        "#,
    )
    .bind(change.product_id)
    .bind(change.action.as_str())
    .bind(previous)
    .bind(new)
    .bind(change.changed_by)
    .bind(timestamp)
    .fetch_one(executor)
    .await
    .map_err(|e| AuditError::Storage(e.into()))?;

    tracing::info!(
        entry_id = entry.id,
        product_id = entry.product_id,
        action = %entry.action,
        changed_by = entry.changed_by,
        "audit entry recorded"
    );

    Ok(entry)
}
