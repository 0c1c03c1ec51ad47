//! Outbound mail. The report dispatcher only sees the [`MailTransport`] trait;
//! the SMTP conversation itself belongs to whatever sits behind the relay.
//!
//! # Relay contract
//!
//! [`RelayTransport`] sends one `POST` to `MAIL_RELAY_URL` per message, with
//! `Content-Type: application/json` and a body of this shape:
//!
//! ```json
//! {
//!   "subject": "Daily Product Changes Report",
//!   "from": "sender@example.com",
//!   "to": ["admin@example.com", "ops@example.com"],
//!   "body": "Hello Admin,\n..."
//! }
//! ```
//!
//! `to` is never empty and `body` is plain text. Any 2xx response counts as
//! delivered. Other statuses fail the cycle with the status code, and so do
//! connection errors and the `MAIL_TIMEOUT_SECS` timeout. There is no retry.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{MailConfig, MailTransportKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no recipients")]
    NoRecipients,

    #[error("mail relay rejected message with status {status}")]
    Rejected { status: u16 },

    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hand the whole message to the transport; one attempt, no retry
    async fn deliver(&self, message: &MailMessage) -> Result<(), DeliveryError>;
}

/// Writes messages to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        if message.to.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }
        tracing::info!(
            subject = %message.subject,
            from = %message.from,
            to = %message.to.join(", "),
            "mail delivered to log\n{}",
            message.body
        );
        Ok(())
    }
}

/// POSTs each message as JSON to an HTTP mail relay
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    url: String,
}

impl RelayTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MailTransport for RelayTransport {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn deliver(&self, message: &MailMessage) -> Result<(), DeliveryError> {
        if message.to.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let response = self.client.post(&self.url).json(message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(url = %self.url, recipients = message.to.len(), "mail handed to relay");
        Ok(())
    }
}

/// Build the transport selected in config
pub fn transport_from_config(config: &MailConfig) -> Result<Arc<dyn MailTransport>, DeliveryError> {
    match config.transport {
        MailTransportKind::Log => Ok(Arc::new(LogTransport)),
        MailTransportKind::Relay => {
            let url = config
                .relay_url
                .clone()
                .ok_or_else(|| DeliveryError::Transport("MAIL_RELAY_URL is not set".to_string()))?;
            Ok(Arc::new(RelayTransport::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
    }
}
