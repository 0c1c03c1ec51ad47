use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::JwtError;
use crate::database::models::User;
use crate::database::users;
use crate::error::ApiError;

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Caller resolved from a bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
        }
    }
}

/// Rejects every request that does not carry a valid admin token
pub async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
    let user = resolve_user(&state, token).await?;

    if !user.is_admin {
        tracing::warn!(user_id = user.id, "non-admin rejected from admin route");
        return Err(ApiError::unauthorized("Only admin can access this"));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Attaches an [`AuthUser`] when the request carries a valid token.
/// Never rejects: anything unresolvable leaves the request anonymous.
pub async fn identify_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer(&headers) {
        match resolve_user(&state, token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!("treating request as anonymous: {}", e),
        }
    }
    next.run(request).await
}

async fn resolve_user(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state.tokens.verify(token).map_err(|e| {
        if !matches!(e, JwtError::Expired) {
            tracing::warn!("rejected bearer token: {}", e);
        }
        ApiError::from(e)
    })?;

    users::find_by_email(state.db.pool(), &claims.sub)
        .await?
        .map(AuthUser::from)
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}
