use chrono::NaiveDate;
use std::fmt;

use super::aggregator::DailyChangeSet;
use crate::database::models::AuditEntry;

pub const DEFAULT_SIGNATURE: &str = "Z Brands";

/// Text body of the daily change report. Rendering is pure and deterministic.
pub struct DailyReport<'a> {
    pub changes: &'a DailyChangeSet,
    pub as_of: NaiveDate,
    pub signature: &'a str,
}

impl fmt::Display for DailyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hello Admin,\n\nHere's a summary of product changes for {}:\n\n",
            self.as_of.format("%Y-%m-%d")
        )?;
        write!(f, "Total Changes: {}\n\n---\n\n", self.changes.total())?;

        section(f, "New Products Added:", &self.changes.added, |f, e| {
            write!(
                f,
                "- Product ID: {} - Added data: {} - Added by User: {}",
                e.product_id,
                snapshot(&e.new_data),
                e.changed_by
            )
        })?;
        section(f, "Products Updated:", &self.changes.updated, |f, e| {
            write!(
                f,
                "- Product ID: {} - Previous data: {} > New data: {} - Updated by User: {}",
                e.product_id,
                snapshot(&e.previous_data),
                snapshot(&e.new_data),
                e.changed_by
            )
        })?;
        section(f, "Products Deleted:", &self.changes.deleted, |f, e| {
            write!(
                f,
                "- Product ID: {} - Deleted data: {} - Deleted by User: {}",
                e.product_id,
                snapshot(&e.previous_data),
                e.changed_by
            )
        })?;

        write!(f, "Best regards,\n{}", self.signature)
    }
}

fn section<F>(f: &mut fmt::Formatter<'_>, title: &str, entries: &[AuditEntry], line: F) -> fmt::Result
where
    F: Fn(&mut fmt::Formatter<'_>, &AuditEntry) -> fmt::Result,
{
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title}")?;
    for entry in entries {
        line(f, entry)?;
        writeln!(f)?;
    }
    write!(f, "---\n\n")
}

fn snapshot(data: &Option<String>) -> &str {
    data.as_deref().unwrap_or("-")
}

/// Render `changes` as the report body for `as_of`.
///
/// Callers skip empty change sets; an empty set still renders, with a zero total.
pub fn compose(changes: &DailyChangeSet, as_of: NaiveDate, signature: &str) -> String {
    DailyReport {
        changes,
        as_of,
        signature,
    }
    .to_string()
}
