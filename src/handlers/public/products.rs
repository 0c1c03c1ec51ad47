// handlers/public/products.rs - GET /products, GET /products/:id

use axum::{extract::State, Extension};

use crate::analytics;
use crate::app::AppState;
use crate::database::models::Product;
use crate::database::products;
use crate::error::ApiError;
use crate::middleware::{ApiPath, ApiResponse, ApiResult, AuthUser};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = products::list(state.db.pool()).await?;
    Ok(ApiResponse::success(products))
}

/// Anonymous reads are counted as views. A failed view write is logged and
/// the product is still returned.
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    caller: Option<Extension<AuthUser>>,
) -> ApiResult<Product> {
    let product = products::find(state.db.pool(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    if caller.is_none() {
        if let Err(e) = analytics::record_view(state.db.pool(), product.id).await {
            tracing::warn!(product_id = product.id, "failed to record product view: {}", e);
        }
    }

    Ok(ApiResponse::success(product))
}
