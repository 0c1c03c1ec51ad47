// handlers/protected/reports.rs - daily change report preview and dispatch

use axum::extract::State;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiQuery, ApiResponse, ApiResult};
use crate::reports::{DispatchOutcome, ReportPreview};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// UTC calendar day; today when omitted
    pub date: Option<NaiveDate>,
}

impl ReportQuery {
    fn day(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
    pub detail: String,
}

/// GET /reports/daily?date=
pub async fn preview(State(state): State<AppState>, ApiQuery(query): ApiQuery<ReportQuery>) -> ApiResult<ReportPreview> {
    let preview = state.reports.preview(query.day()).await?;
    Ok(ApiResponse::success(preview))
}

/// POST /reports/daily/dispatch?date=
pub async fn dispatch(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<DispatchResponse> {
    let outcome = state.reports.dispatch_for(query.day()).await;

    if outcome.is_failed() {
        return Err(ApiError::bad_gateway(outcome.detail()));
    }

    Ok(ApiResponse::success(DispatchResponse {
        detail: outcome.detail(),
        outcome,
    }))
}
