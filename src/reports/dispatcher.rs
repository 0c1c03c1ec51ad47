use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::aggregator::{self, DailyChangeSet};
use super::composer;
use crate::config::ReportConfig;
use crate::database::models::AuditEntry;
use crate::database::{users, Database, DatabaseError};
use crate::mail::{MailMessage, MailTransport};

/// Storage reads a dispatch cycle needs
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn daily_changes(&self, day: NaiveDate) -> Result<DailyChangeSet, DatabaseError>;

    async fn admin_emails(&self) -> Result<Vec<String>, DatabaseError>;
}

#[async_trait]
impl ReportStore for Database {
    async fn daily_changes(&self, day: NaiveDate) -> Result<DailyChangeSet, DatabaseError> {
        aggregator::aggregate(self.pool(), day).await
    }

    async fn admin_emails(&self) -> Result<Vec<String>, DatabaseError> {
        users::admin_emails(self.pool()).await
    }
}

/// Result of one dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Sent {
        day: NaiveDate,
        total_changes: usize,
        recipients: usize,
    },
    Skipped {
        day: NaiveDate,
    },
    Failed {
        day: NaiveDate,
        reason: String,
    },
}

impl DispatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }

    pub fn detail(&self) -> String {
        match self {
            DispatchOutcome::Sent { .. } => "Report successfully sent!".to_string(),
            DispatchOutcome::Skipped { .. } => "No changes were found, report skipped.".to_string(),
            DispatchOutcome::Failed { reason, .. } => format!("Report failed: {reason}"),
        }
    }
}

/// Composed report for a day without sending it
#[derive(Debug, Clone, Serialize)]
pub struct ReportPreview {
    pub date: NaiveDate,
    pub total_changes: usize,
    pub added: Vec<AuditEntry>,
    pub updated: Vec<AuditEntry>,
    pub deleted: Vec<AuditEntry>,
    pub body: Option<String>,
}

/// Runs aggregate → compose → deliver cycles.
///
/// Holds no state between cycles; every call starts from scratch.
pub struct ReportDispatcher {
    store: Arc<dyn ReportStore>,
    transport: Arc<dyn MailTransport>,
    config: ReportConfig,
}

impl ReportDispatcher {
    pub fn new(store: Arc<dyn ReportStore>, transport: Arc<dyn MailTransport>, config: ReportConfig) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// One cycle for the UTC calendar day of `now`
    pub async fn dispatch(&self, now: DateTime<Utc>) -> DispatchOutcome {
        self.dispatch_for(now.date_naive()).await
    }

    pub async fn dispatch_for(&self, day: NaiveDate) -> DispatchOutcome {
        let changes = match self.store.daily_changes(day).await {
            Ok(changes) => changes,
            Err(e) => return Self::failed(day, format!("failed to read audit log: {e}")),
        };

        if changes.is_empty() {
            tracing::debug!(%day, "no product changes, report skipped");
            return DispatchOutcome::Skipped { day };
        }

        let body = composer::compose(&changes, day, &self.config.signature);

        let recipients = match self.store.admin_emails().await {
            Ok(recipients) if recipients.is_empty() => {
                return Self::failed(day, "no admin recipients".to_string());
            }
            Ok(recipients) => recipients,
            Err(e) => return Self::failed(day, format!("failed to resolve recipients: {e}")),
        };

        let message = MailMessage {
            subject: self.config.subject.clone(),
            from: self.config.sender.clone(),
            to: recipients,
            body,
        };

        if let Err(e) = self.transport.deliver(&message).await {
            return Self::failed(day, format!("{} transport: {e}", self.transport.name()));
        }

        tracing::info!(%day, total_changes = changes.total(), recipients = message.to.len(), "daily report sent");
        DispatchOutcome::Sent {
            day,
            total_changes: changes.total(),
            recipients: message.to.len(),
        }
    }

    pub async fn preview(&self, day: NaiveDate) -> Result<ReportPreview, DatabaseError> {
        let changes = self.store.daily_changes(day).await?;
        let body = (!changes.is_empty()).then(|| composer::compose(&changes, day, &self.config.signature));

        Ok(ReportPreview {
            date: day,
            total_changes: changes.total(),
            added: changes.added,
            updated: changes.updated,
            deleted: changes.deleted,
            body,
        })
    }

    fn failed(day: NaiveDate, reason: String) -> DispatchOutcome {
        tracing::error!(%day, %reason, "daily report failed");
        DispatchOutcome::Failed { day, reason }
    }
}
