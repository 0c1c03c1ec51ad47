// handlers/public/views.rs - anonymous view counts

use axum::extract::State;

use crate::analytics::{self, ViewFilter};
use crate::app::AppState;
use crate::database::models::ProductViewCount;
use crate::error::ApiError;
use crate::middleware::{ApiPath, ApiQuery, ApiResponse, ApiResult};

/// GET /product-views
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ProductViewCount>> {
    let counts = analytics::view_counts(state.db.pool(), ViewFilter::default()).await?;
    Ok(ApiResponse::success(counts))
}

/// GET /product-views/filter?month=&year=
pub async fn filter(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ViewFilter>,
) -> ApiResult<Vec<ProductViewCount>> {
    if !filter.is_valid() {
        return Err(ApiError::bad_request("Month must be between 1 and 12"));
    }
    let counts = analytics::view_counts(state.db.pool(), filter).await?;
    Ok(ApiResponse::success(counts))
}

/// GET /product-views/:product_id
pub async fn get(State(state): State<AppState>, ApiPath(product_id): ApiPath<i64>) -> ApiResult<ProductViewCount> {
    let count = analytics::view_count(state.db.pool(), product_id).await?;
    Ok(ApiResponse::success(count))
}
