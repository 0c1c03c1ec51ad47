mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::database::users;
use common::{TestServer, ADMIN_EMAIL};

async fn user_id(server: &TestServer, email: &str) -> Result<i64> {
    let user = users::find_by_email(server.db.pool(), email)
        .await?
        .context("user not found")?;
    Ok(user.id)
}

#[tokio::test]
async fn admin_updates_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    server.user_token("shopper@test.com").await?;
    let id = user_id(&server, "shopper@test.com").await?;

    let res = server
        .client
        .patch(server.url(&format!("/user/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "email": "manager@test.com", "is_admin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!({ "id": id, "email": "manager@test.com", "is_admin": true }));
    assert!(body["data"].get("password").is_none());

    // Password is unchanged, so the renamed account can still log in
    server.token("manager@test.com", "secret-pw").await?;
    Ok(())
}

#[tokio::test]
async fn update_unknown_or_duplicate_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    server.user_token("shopper@test.com").await?;
    let id = user_id(&server, "shopper@test.com").await?;

    let missing = server
        .client
        .patch(server.url("/user/9999"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "x@test.com", "is_admin": false }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await?;
    assert_eq!(body["message"], "User not found");

    let clash = server
        .client
        .patch(server.url(&format!("/user/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "email": ADMIN_EMAIL, "is_admin": false }))
        .send()
        .await?;
    assert_eq!(clash.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn admin_deletes_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    server.user_token("shopper@test.com").await?;
    let id = user_id(&server, "shopper@test.com").await?;

    let res = server
        .client
        .delete(server.url(&format!("/user/{id}")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["message"], "User deleted successfully");

    let again = server
        .client
        .delete(server.url(&format!("/user/{id}")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn user_with_audit_history_cannot_be_deleted() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    server.create_product(&admin, "SKU-1", 10.0).await?;
    let admin_id = user_id(&server, ADMIN_EMAIL).await?;

    let res = server
        .client
        .delete(server.url(&format!("/user/{admin_id}")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    assert!(users::find_by_id(server.db.pool(), admin_id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn user_routes_require_admin() -> Result<()> {
    let server = TestServer::spawn().await?;
    let user = server.user_token("shopper@test.com").await?;
    let id = user_id(&server, "shopper@test.com").await?;

    let res = server
        .client
        .delete(server.url(&format!("/user/{id}")))
        .bearer_auth(&user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(users::find_by_id(server.db.pool(), id).await?.is_some());
    Ok(())
}
