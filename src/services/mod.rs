//! Services layer - read-model business logic
//!
//! Services compose repository queries into display-ready DTOs. Nothing
//! in this layer raises to its caller: every store failure resolves to a
//! type-appropriate empty value, so a degraded page renders as empty
//! sections rather than an error.

pub mod analytics;
pub mod content;
pub mod export;

pub use analytics::AnalyticsService;
pub use content::ContentService;
pub use export::{report_stat_lines, stats_csv};

use std::future::Future;

use crate::db::is_missing_relation;

/// Await a repository call, substituting `fallback` on failure.
///
/// A missing relation means the database has not been migrated yet and
/// is logged at warn level; anything else is a real store failure and is
/// logged at error level. Callers see the same degraded value either way.
pub(crate) async fn fetch_or<T>(
    query: &'static str,
    fallback: T,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> T {
    match fut.await {
        Ok(value) => value,
        Err(err) if is_missing_relation(&err) => {
            tracing::warn!(query, "relation not migrated yet, substituting empty result");
            fallback
        }
        Err(err) => {
            tracing::error!(query, error = %err, "store query failed, substituting empty result");
            fallback
        }
    }
}
