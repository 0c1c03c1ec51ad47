#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{routing::post, Json, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::app::{self, AppState};
use catalog_api::auth;
use catalog_api::config::{AppConfig, MailTransportKind};
use catalog_api::database::Database;
use catalog_api::mail::{self, MailMessage};

pub const ADMIN_EMAIL: &str = "admin_test@test.com";
pub const ADMIN_PASSWORD: &str = "admin_test";

/// One server per test. Each `#[tokio::test]` owns its runtime, so a server
/// shared across tests would die with the first test that finishes.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub db: Database,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::test()).await
    }

    pub async fn spawn_with(mut config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        config.api.port = port;

        let db = Database::connect(&config.database).await?;
        db.migrate().await?;
        auth::bootstrap_admin(&db, &config.admin).await?;

        let transport = mail::transport_from_config(&config.mail)?;
        let state = AppState::new(config, db.clone(), transport)?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app::router(state)).await {
                eprintln!("test server stopped: {e}");
            }
        });

        let server = Self {
            port,
            base_url,
            db,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn token(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a regular user and return a token for it
    pub async fn user_token(&self, email: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/register"))
            .json(&json!({ "email": email, "password": "secret-pw", "is_admin": false }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        self.token(email, "secret-pw").await
    }

    /// Create a product as admin and return its id
    pub async fn create_product(&self, token: &str, sku: &str, price: f64) -> Result<i64> {
        let res = self
            .client
            .post(self.url("/products"))
            .bearer_auth(token)
            .json(&json!({ "name": format!("Product {sku}"), "sku": sku, "price": price, "brand": "Acme" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());

        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("missing product id")
    }
}

/// HTTP mail relay that keeps every message it receives
pub struct TestRelay {
    pub url: String,
    received: Arc<Mutex<Vec<MailMessage>>>,
}

impl TestRelay {
    pub async fn spawn() -> Result<Self> {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let relay = Router::new().route(
            "/send",
            post(move |Json(message): Json<MailMessage>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(message);
                    StatusCode::ACCEPTED
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/send", listener.local_addr()?);
        tokio::spawn(async move {
            let _ = axum::serve(listener, relay).await;
        });

        Ok(Self { url, received })
    }

    pub fn messages(&self) -> Vec<MailMessage> {
        self.received.lock().unwrap().clone()
    }

    /// Test config whose mail goes to this relay
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::test();
        config.mail.transport = MailTransportKind::Relay;
        config.mail.relay_url = Some(self.url.clone());
        config
    }
}
