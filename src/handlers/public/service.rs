// handlers/public/service.rs - GET /, GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Catalog API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Product catalog with audit history, view analytics and a daily change report",
            "endpoints": {
                "auth": "/token, /register (public)",
                "products": "/products[/:id] (read public, write admin)",
                "views": "/product-views[/:product_id], /product-views/filter (public)",
                "users": "/user/:id (admin)",
                "reports": "/reports/daily, /reports/daily/dispatch (admin)",
                "health": "/health (public)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
