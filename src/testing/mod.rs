//! Shared fixtures for unit tests
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::database::models::{AuditAction, AuditEntry, User};
use crate::database::{users, Database, DatabaseError};
use crate::mail::{DeliveryError, MailMessage, MailTransport};
use crate::reports::{DailyChangeSet, ReportStore};

/// Fresh migrated in-memory database
pub async fn memory_database() -> Database {
    let db = Database::connect(&AppConfig::test().database)
        .await
        .expect("open in-memory database");
    db.migrate().await.expect("migrate in-memory database");
    db
}

/// Insert a user; the password column gets a placeholder, not a real hash
pub async fn seed_user(db: &Database, email: &str, is_admin: bool) -> User {
    users::insert(db.pool(), email, "not-a-hash", is_admin)
        .await
        .expect("seed user")
}

pub fn entry(id: i64, product_id: i64, action: AuditAction, timestamp: DateTime<Utc>) -> AuditEntry {
    let (previous_data, new_data) = match action {
        AuditAction::Added => (None, Some("{}".to_string())),
        AuditAction::Updated => (Some("{}".to_string()), Some("{}".to_string())),
        AuditAction::Deleted => (Some("{}".to_string()), None),
    };
    AuditEntry {
        id,
        product_id,
        action,
        previous_data,
        new_data,
        changed_by: 1,
        timestamp,
    }
}

/// Keeps every delivered message
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Transport that is always down
#[derive(Debug, Default)]
pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn deliver(&self, _message: &MailMessage) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("connection refused".to_string()))
    }
}

/// Store with fixed contents; every day returns the same entries
pub struct StaticStore {
    entries: Vec<AuditEntry>,
    admins: Vec<String>,
    available: bool,
}

impl StaticStore {
    pub fn new(entries: Vec<AuditEntry>, admins: Vec<String>) -> Self {
        Self {
            entries,
            admins,
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            entries: Vec::new(),
            admins: Vec::new(),
            available: false,
        }
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.available {
            Ok(())
        } else {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolClosed))
        }
    }
}

#[async_trait]
impl ReportStore for StaticStore {
    async fn daily_changes(&self, day: NaiveDate) -> Result<DailyChangeSet, DatabaseError> {
        self.check()?;
        Ok(DailyChangeSet::from_entries(day, self.entries.clone()))
    }

    async fn admin_emails(&self) -> Result<Vec<String>, DatabaseError> {
        self.check()?;
        Ok(self.admins.clone())
    }
}
