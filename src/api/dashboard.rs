//! Dashboard API endpoints
//!
//! - GET /api/v1/dashboard/stats - composite report for the admin UI
//! - GET /api/v1/dashboard/export - the same stats as a two-section CSV

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::AppState;
use crate::cache::RequestMemo;
use crate::models::{DashboardReport, ReportWindow};
use crate::services::{report_stat_lines, stats_csv};

/// Query parameters for the dashboard report
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Length of the reporting window in days
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

impl ReportQuery {
    fn window(&self) -> ReportWindow {
        ReportWindow::trailing_days(self.days.clamp(1, 365))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/export", get(export))
}

async fn stats(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Json<DashboardReport> {
    let memo = RequestMemo::new();
    Json(state.analytics.dashboard_report(query.window(), &memo).await)
}

async fn export(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let memo = RequestMemo::new();
    let report = state.analytics.dashboard_report(query.window(), &memo).await;
    let csv = stats_csv(&report_stat_lines(&report), &report.top_tours);

    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"dashboard.csv\"",
            ),
        ],
        csv,
    )
}
