//! HTTP API layer
//!
//! Thin axum handlers over the content and analytics services. Handlers
//! parse query parameters, build one request-scoped memoizer, call the
//! services and serialize the DTOs. The services never fail, so the only
//! non-200 response on these routes is a 404 on the by-slug paths.

pub mod dashboard;
pub mod posts;
pub mod taxonomy;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::SharedDb;
use crate::services::{AnalyticsService, ContentService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDb,
    pub content: Arc<ContentService>,
    pub analytics: Arc<AnalyticsService>,
}

/// Build the application router
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::permissive(),
    };

    let api = Router::new()
        .nest("/posts", posts::router())
        .nest("/dashboard", dashboard::router())
        .merge(taxonomy::router())
        .route("/health", get(health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/v1/health - store connectivity probe
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(serde_json::json!({ "status": status }))
}
