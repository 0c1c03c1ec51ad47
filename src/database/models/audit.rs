use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// Kind of product mutation an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Added,
    Updated,
    Deleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Added => "ADDED",
            AuditAction::Updated => "UPDATED",
            AuditAction::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown audit action '{}'", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for AuditAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADDED" => Ok(AuditAction::Added),
            "UPDATED" => Ok(AuditAction::Updated),
            "DELETED" => Ok(AuditAction::Deleted),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// Immutable record of one product mutation.
///
/// `previous_data` and `new_data` hold the JSON snapshots exactly as they were
/// written; the report prints them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub product_id: i64,
    pub action: AuditAction,
    pub previous_data: Option<String>,
    pub new_data: Option<String>,
    pub changed_by: i64,
    pub timestamp: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for AuditEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let action: String = row.try_get("action")?;
        let action = action.parse().map_err(|e: UnknownAction| sqlx::Error::ColumnDecode {
            index: "action".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            action,
            previous_data: row.try_get("previous_data")?,
            new_data: row.try_get("new_data")?,
            changed_by: row.try_get("changed_by")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}
