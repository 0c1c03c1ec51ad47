use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{JwtError, TokenService};
use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::{protected, public};
use crate::mail::MailTransport;
use crate::middleware::{identify_user, require_admin};
use crate::reports::ReportDispatcher;

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub reports: Arc<ReportDispatcher>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database, transport: Arc<dyn MailTransport>) -> Result<Self, JwtError> {
        let tokens = TokenService::from_config(&config.security)?;
        let reports = ReportDispatcher::new(Arc::new(db.clone()), transport, config.report.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            tokens: Arc::new(tokens),
            reports: Arc::new(reports),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(public::service::root))
        .route("/health", get(public::service::health))
        .merge(public_routes())
        .merge(identified_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .layer(TraceLayer::new_for_http());

    if state.config.api.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, products, views};

    Router::new()
        .route("/token", post(auth::token_post))
        .route("/products", get(products::list))
        .route("/product-views", get(views::list))
        .route("/product-views/filter", get(views::filter))
        .route("/product-views/:product_id", get(views::get))
}

/// Routes that behave differently for authenticated callers
fn identified_routes(state: AppState) -> Router<AppState> {
    use public::{auth, products};

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/products/:id", get(products::get))
        .route_layer(middleware::from_fn_with_state(state, identify_user))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use protected::{products, reports, users};

    Router::new()
        .route("/products", post(products::create))
        .route(
            "/products/:id",
            put(products::replace).patch(products::patch).delete(products::delete),
        )
        .route("/user/:id", patch(users::patch).delete(users::delete))
        .route("/reports/daily", get(reports::preview))
        .route("/reports/daily/dispatch", post(reports::dispatch))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
