use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqliteExecutor;

use crate::database::models::{AuditAction, AuditEntry};
use crate::database::DatabaseError;

/// Audit entries of one UTC calendar day, grouped by action.
///
/// Within each group entries keep the order they were read in
/// (timestamp, then id).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyChangeSet {
    pub day: NaiveDate,
    pub added: Vec<AuditEntry>,
    pub updated: Vec<AuditEntry>,
    pub deleted: Vec<AuditEntry>,
}

impl DailyChangeSet {
    pub fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            added: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }

    pub fn from_entries(day: NaiveDate, entries: impl IntoIterator<Item = AuditEntry>) -> Self {
        let mut changes = Self::empty(day);
        for entry in entries {
            changes.push(entry);
        }
        changes
    }

    pub fn push(&mut self, entry: AuditEntry) {
        match entry.action {
            AuditAction::Added => self.added.push(entry),
            AuditAction::Updated => self.updated.push(entry),
            AuditAction::Deleted => self.deleted.push(entry),
        }
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Half-open UTC range `[day 00:00, day+1 00:00)`
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = day
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(chrono::NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Read every audit entry written on `day` (UTC) and group it by action
pub async fn aggregate<'e, E>(executor: E, day: NaiveDate) -> Result<DailyChangeSet, DatabaseError>
where
    E: SqliteExecutor<'e>,
{
    let (start, end) = day_bounds(day);

    let entries = sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, product_id, action, previous_data, new_data, changed_by, timestamp
        FROM audit_log
        WHERE timestamp >= ?1 AND timestamp < ?2
        ORDER BY timestamp ASC, id ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?;

    let changes = DailyChangeSet::from_entries(day, entries);
    tracing::debug!(
        %day,
        added = changes.added.len(),
        updated = changes.updated.len(),
        deleted = changes.deleted.len(),
        "aggregated daily changes"
    );
    Ok(changes)
}
