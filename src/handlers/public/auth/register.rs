// handlers/public/auth/register.rs - POST /register handler

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::hash_password;
use crate::database::users;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Anyone may register a regular account. Creating an admin account
/// requires the caller to be an admin.
pub async fn register_post(
    State(state): State<AppState>,
    caller: Option<Extension<AuthUser>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<Value> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    if users::find_by_email(state.db.pool(), &body.email).await?.is_some() {
        return Err(ApiError::bad_request("A user with that email already exists"));
    }

    let caller_is_admin = caller.map_or(false, |Extension(user)| user.is_admin);
    if body.is_admin && !caller_is_admin {
        return Err(ApiError::forbidden("Only admin users can create admin users"));
    }

    let hash = hash_password(&body.password)?;
    let user = users::insert(state.db.pool(), &body.email, &hash, body.is_admin).await?;
    tracing::info!(user_id = user.id, is_admin = user.is_admin, "user registered");

    Ok(ApiResponse::created(json!({ "message": "User created successfully" })))
}
