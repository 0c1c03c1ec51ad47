//! Append-only audit trail of product mutations.
//!
//! Every create, update and delete of a product writes exactly one
//! [`AuditEntry`](crate::database::models::AuditEntry). Entries are never
//! updated or removed.

pub mod recorder;

use thiserror::Error;

use crate::database::DatabaseError;

pub use recorder::{record, snapshot, AuditChange};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Invalid audit entry: {0}")]
    Validation(String),

    #[error("Failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
