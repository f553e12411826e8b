//! Post API endpoints
//!
//! - GET /api/v1/posts - list published posts with filters and pagination
//! - GET /api/v1/posts/{slug} - single post (records a view)
//! - GET /api/v1/posts/{slug}/related - related posts

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::AppState;
use crate::cache::RequestMemo;
use crate::models::{PostPage, PostQuery, PostView};

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Category slug filter
    pub category: Option<String>,
    /// Tag slug filter
    pub tag: Option<String>,
    /// Author ID filter
    pub author: Option<i64>,
    /// Featured-only filter
    pub featured: Option<bool>,
    /// Search over title, excerpt and body
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl From<ListPostsQuery> for PostQuery {
    fn from(query: ListPostsQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            category: query.category,
            tag: query.tag,
            author_id: query.author,
            featured: query.featured,
            search: query.search,
        }
    }
}

/// Query parameters for the related-posts listing
#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    #[serde(default = "default_related_limit")]
    pub limit: u32,
}

fn default_related_limit() -> u32 {
    3
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
        .route("/{slug}/related", get(related_posts))
}

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Json<PostPage> {
    let memo = RequestMemo::new();
    Json(state.content.list(&query.into(), &memo).await)
}

async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostView>, StatusCode> {
    let memo = RequestMemo::new();
    state
        .content
        .get_by_slug(&slug, &memo)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> Json<Vec<PostView>> {
    let memo = RequestMemo::new();
    Json(state.content.related(&slug, query.limit, &memo).await)
}
