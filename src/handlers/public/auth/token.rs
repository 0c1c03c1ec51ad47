// handlers/public/auth/token.rs - POST /token handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::verify_password;
use crate::database::users;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Unknown email and wrong password give the same 401
pub async fn token_post(State(state): State<AppState>, ApiJson(body): ApiJson<TokenRequest>) -> ApiResult<TokenResponse> {
    let user = users::find_by_email(state.db.pool(), &body.email).await?;

    let user = match user {
        Some(user) if verify_password(&body.password, &user.password) => user,
        _ => {
            tracing::warn!(email = %body.email, "failed login attempt");
            return Err(ApiError::unauthorized("Could not validate credentials"));
        }
    };

    let access_token = state.tokens.issue(&user.email)?;
    tracing::info!(user_id = user.id, "token issued");

    Ok(ApiResponse::created(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
