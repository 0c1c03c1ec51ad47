// handlers/protected/users.rs - admin user management

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::UserSummary;
use crate::database::{users, DatabaseError};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub email: String,
    pub is_admin: bool,
}

/// PATCH /user/:id
pub async fn patch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> ApiResult<UserSummary> {
    if body.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let user = users::update(state.db.pool(), id, &body.email, body.is_admin)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::conflict("A user with that email already exists"),
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = id, is_admin = user.is_admin, "user updated");
    Ok(ApiResponse::success(UserSummary::from(&user)))
}

/// DELETE /user/:id
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    let deleted = users::delete(state.db.pool(), id).await.map_err(|e| match e {
        DatabaseError::Constraint(_) => ApiError::conflict("User is referenced by audit history"),
        other => other.into(),
    })?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = id, "user deleted");
    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}
