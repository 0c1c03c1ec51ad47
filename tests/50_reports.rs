mod common;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::config::{AppConfig, MailTransportKind};
use common::{TestRelay, TestServer, ADMIN_EMAIL};

#[tokio::test]
async fn preview_lists_todays_changes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    let id = server.create_product(&admin, "KT-1", 10.0).await?;
    server
        .client
        .patch(server.url(&format!("/products/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "price": 12.0 }))
        .send()
        .await?;

    let body: Value = server
        .client
        .get(server.url("/reports/daily"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    let preview = &body["data"];

    assert_eq!(preview["date"], Utc::now().date_naive().to_string());
    assert_eq!(preview["total_changes"], 2);
    assert_eq!(preview["added"].as_array().unwrap().len(), 1);
    assert_eq!(preview["updated"].as_array().unwrap().len(), 1);
    assert_eq!(preview["deleted"], json!([]));

    let text = preview["body"].as_str().unwrap();
    assert!(text.starts_with("Hello Admin,"));
    assert!(text.contains("Total Changes: 2"));
    assert!(text.contains("New Products Added:"));
    assert!(!text.contains("Products Deleted:"));
    Ok(())
}

#[tokio::test]
async fn preview_of_quiet_day_has_no_body() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    server.create_product(&admin, "KT-1", 10.0).await?;

    let body: Value = server
        .client
        .get(server.url("/reports/daily?date=2001-02-03"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["date"], "2001-02-03");
    assert_eq!(body["data"]["total_changes"], 0);
    assert!(body["data"]["body"].is_null());
    Ok(())
}

#[tokio::test]
async fn dispatch_mails_every_admin() -> Result<()> {
    let relay = TestRelay::spawn().await?;
    let server = TestServer::spawn_with(relay.config()).await?;
    let admin = server.admin_token().await?;
    server
        .client
        .post(server.url("/register"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "second_admin@test.com", "password": "pw", "is_admin": true }))
        .send()
        .await?;
    server.user_token("shopper@test.com").await?;
    server.create_product(&admin, "KT-1", 10.0).await?;

    let res = server
        .client
        .post(server.url("/reports/daily/dispatch"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["outcome"], "sent");
    assert_eq!(body["data"]["total_changes"], 1);
    assert_eq!(body["data"]["recipients"], 2);
    assert_eq!(body["data"]["detail"], "Report successfully sent!");

    let messages = relay.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, vec![ADMIN_EMAIL, "second_admin@test.com"]);
    assert_eq!(messages[0].subject, "Daily Product Changes Report");
    assert_eq!(messages[0].from, "sender@example.com");
    assert!(messages[0].body.ends_with("Best regards,\nZ Brands"));
    Ok(())
}

#[tokio::test]
async fn dispatch_of_quiet_day_is_skipped() -> Result<()> {
    let relay = TestRelay::spawn().await?;
    let server = TestServer::spawn_with(relay.config()).await?;
    let admin = server.admin_token().await?;

    let body: Value = server
        .client
        .post(server.url("/reports/daily/dispatch"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"]["outcome"], "skipped");
    assert_eq!(body["data"]["detail"], "No changes were found, report skipped.");
    assert!(relay.messages().is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_relay_fails_the_dispatch() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");
    let mut config = AppConfig::test();
    config.mail.transport = MailTransportKind::Relay;
    config.mail.relay_url = Some(format!("http://127.0.0.1:{port}/send"));
    config.mail.timeout_secs = 2;

    let server = TestServer::spawn_with(config).await?;
    let admin = server.admin_token().await?;
    let id = server.create_product(&admin, "KT-1", 10.0).await?;

    let res = server
        .client
        .post(server.url("/reports/daily/dispatch"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await?;
    assert!(body["message"].as_str().unwrap().starts_with("Report failed:"));

    // The failed cycle leaves the catalog untouched
    let product = server.client.get(server.url(&format!("/products/{id}"))).send().await?;
    assert_eq!(product.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn report_routes_require_admin() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user_token("shopper@test.com").await?;

    let res = server
        .client
        .post(server.url("/reports/daily/dispatch"))
        .bearer_auth(&user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
