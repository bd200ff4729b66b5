use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::services::{TagLocks, TagStore};
use crate::server::config::ServerConfig;
use crate::web::middleware::auth;
use crate::web::routes::tag_routes;

pub mod envelope;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

/// Per-request context shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub tag_store: Arc<dyn TagStore>,
    pub tag_locks: TagLocks,
    pub config: Arc<ServerConfig>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(tag_store: Arc<dyn TagStore>, config: Arc<ServerConfig>) -> Router {
    let app_state = Arc::new(AppState {
        tag_store,
        tag_locks: TagLocks::new(),
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest(
            "/api/tags",
            tag_routes::create_tags_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
