use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub report: ReportConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
    Test,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub jwt_expiry_minutes: i64,
}

/// Credentials for the admin account bootstrapped at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub subject: String,
    pub sender: String,
    pub signature: String,
}

impl ReportConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailTransportKind {
    Log,
    Relay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    pub relay_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(port) = env::var("CATALOG_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ALGORITHM") {
            self.security.jwt_algorithm = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }

        // Admin bootstrap
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.admin.email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.admin.password = Some(v);
        }

        // Report overrides
        if let Ok(v) = env::var("REPORT_ENABLED") {
            self.report.enabled = v.parse().unwrap_or(self.report.enabled);
        }
        if let Ok(v) = env::var("REPORT_INTERVAL_SECS") {
            self.report.interval_secs = v.parse().unwrap_or(self.report.interval_secs);
        }
        if let Ok(v) = env::var("REPORT_SUBJECT") {
            self.report.subject = v;
        }
        if let Ok(v) = env::var("REPORT_SENDER") {
            self.report.sender = v;
        }
        if let Ok(v) = env::var("REPORT_SIGNATURE") {
            self.report.signature = v;
        }

        // Mail overrides
        if let Ok(v) = env::var("MAIL_TRANSPORT") {
            self.mail.transport = match v.to_ascii_lowercase().as_str() {
                "relay" => MailTransportKind::Relay,
                "log" => MailTransportKind::Log,
                _ => self.mail.transport,
            };
        }
        if let Ok(v) = env::var("MAIL_RELAY_URL") {
            self.mail.relay_url = Some(v);
        }
        if let Ok(v) = env::var("MAIL_TIMEOUT_SECS") {
            self.mail.timeout_secs = v.parse().unwrap_or(self.mail.timeout_secs);
        }

        self
    }

    /// Check settings that would otherwise fail at first use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if !self.security.jwt_algorithm.starts_with("HS") {
            return Err(ConfigError::UnsupportedAlgorithm(self.security.jwt_algorithm.clone()));
        }
        if self.mail.transport == MailTransportKind::Relay && self.mail.relay_url.is_none() {
            return Err(ConfigError::Missing("MAIL_RELAY_URL"));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite://catalog.db?mode=rwc".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_cors: true,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                jwt_algorithm: "HS256".to_string(),
                jwt_expiry_minutes: 30,
            },
            admin: AdminConfig::default(),
            report: ReportConfig {
                enabled: true,
                interval_secs: 60,
                ..ReportConfig::default()
            },
            mail: MailConfig {
                transport: MailTransportKind::Log,
                relay_url: None,
                timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite://catalog.db?mode=rwc".to_string(),
                max_connections: 10,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                enable_cors: false,
            },
            security: SecurityConfig {
                // Must be provided through JWT_SECRET
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                jwt_expiry_minutes: 30,
            },
            admin: AdminConfig::default(),
            report: ReportConfig::default(),
            mail: MailConfig {
                transport: MailTransportKind::Relay,
                relay_url: None,
                timeout_secs: 10,
            },
        }
    }

    /// Preset for tests: in-memory database, no scheduler, log transport
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 0,
                enable_cors: true,
            },
            security: SecurityConfig {
                jwt_secret: "V3OwumLWmf3DPijohTNBWYUYQFqE7wDV3SoW8Ri0o0c=".to_string(),
                jwt_algorithm: "HS256".to_string(),
                jwt_expiry_minutes: 30,
            },
            admin: AdminConfig {
                email: Some("admin_test@test.com".to_string()),
                password: Some("admin_test".to_string()),
            },
            report: ReportConfig {
                enabled: false,
                ..ReportConfig::default()
            },
            mail: MailConfig {
                transport: MailTransportKind::Log,
                relay_url: None,
                timeout_secs: 2,
            },
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 24 * 60 * 60,
            subject: "Daily Product Changes Report".to_string(),
            sender: "sender@example.com".to_string(),
            signature: crate::reports::composer::DEFAULT_SIGNATURE.to_string(),
        }
    }
}
