// handlers/protected/products.rs - admin product mutations
//
// Every mutation and its audit entry are written in one transaction; if the
// audit write fails the product change is rolled back with it.

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::app::AppState;
use crate::audit::{self, AuditChange};
use crate::database::models::{Product, ProductInput, ProductPatch};
use crate::database::products;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    validate(&input)?;

    let mut tx = state.db.begin().await?;
    ensure_sku_free(&mut tx, &input.sku, None).await?;

    let product = products::insert(&mut *tx, &input).await?;
    audit::record(&mut *tx, &AuditChange::added(product.id, audit::snapshot(&product)?, admin.id)).await?;
    tx.commit().await?;

    tracing::info!(product_id = product.id, sku = %product.sku, "product created");
    Ok(ApiResponse::created(product))
}

/// PUT /products/:id
pub async fn replace(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    validate(&input)?;
    let product = update(&state, &admin, id, |_| input).await?;
    Ok(ApiResponse::success(product))
}

/// PATCH /products/:id
pub async fn patch(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<ProductPatch>,
) -> ApiResult<Product> {
    let product = update(&state, &admin, id, |current| changes.apply(current)).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Value> {
    let mut tx = state.db.begin().await?;
    let current = products::find(&mut *tx, id).await?.ok_or_else(product_not_found)?;

    products::delete(&mut *tx, id).await?;
    audit::record(&mut *tx, &AuditChange::deleted(id, audit::snapshot(&current)?, admin.id)).await?;
    tx.commit().await?;

    tracing::info!(product_id = id, "product deleted");
    Ok(ApiResponse::success(json!({ "message": "Product deleted successfully" })))
}

async fn update<F>(state: &AppState, admin: &AuthUser, id: i64, build: F) -> Result<Product, ApiError>
where
    F: FnOnce(&Product) -> ProductInput,
{
    let mut tx = state.db.begin().await?;
    let current = products::find(&mut *tx, id).await?.ok_or_else(product_not_found)?;

    let input = build(&current);
    validate(&input)?;
    ensure_sku_free(&mut tx, &input.sku, Some(id)).await?;

    let updated = products::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(product_not_found)?;
    let change = AuditChange::updated(id, audit::snapshot(&current)?, audit::snapshot(&updated)?, admin.id);
    audit::record(&mut *tx, &change).await?;
    tx.commit().await?;

    tracing::info!(product_id = id, "product updated");
    Ok(updated)
}

async fn ensure_sku_free(conn: &mut SqliteConnection, sku: &str, except: Option<i64>) -> Result<(), ApiError> {
    match products::find_by_sku(conn, sku).await? {
        Some(existing) if Some(existing.id) != except => Err(ApiError::conflict("SKU already exist")),
        _ => Ok(()),
    }
}

fn validate(input: &ProductInput) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|errors| ApiError::validation_error("Invalid product", Some(errors)))
}

fn product_not_found() -> ApiError {
    ApiError::not_found("Product not found")
}
