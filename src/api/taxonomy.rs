//! Category and tag API endpoints
//!
//! - GET /api/v1/categories - categories with published-post counts
//! - GET /api/v1/tags - tags with published-post counts

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::AppState;
use crate::cache::RequestMemo;
use crate::models::{CategoryWithCount, TagWithCount};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/tags", get(list_tags))
}

async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategoryWithCount>> {
    let memo = RequestMemo::new();
    Json(state.content.categories(&memo).await)
}

async fn list_tags(State(state): State<AppState>) -> Json<Vec<TagWithCount>> {
    let memo = RequestMemo::new();
    Json(state.content.tags(&memo).await)
}
