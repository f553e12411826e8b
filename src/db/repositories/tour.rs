//! Tour repository
//!
//! Detail lookups used to hydrate ranked dashboard rows, plus the
//! site-wide tour count.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::TourSummary;

/// Tour repository trait
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Descriptive fields for one tour
    async fn find_summary(&self, id: i64) -> Result<Option<TourSummary>>;

    /// Total number of tours
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based tour repository implementation
pub struct SqlxTourRepository {
    db: SharedDb,
}

impl SqlxTourRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn TourRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl TourRepository for SqlxTourRepository {
    async fn find_summary(&self, id: i64) -> Result<Option<TourSummary>> {
        let row = sqlx::query("SELECT id, name, price, rating FROM tours WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .context("Failed to get tour summary")?;

        Ok(row.map(|row| TourSummary {
            id: row.get("id"),
            name: row.get("name"),
            price: row.get("price"),
            rating: row.get("rating"),
        }))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM tours")
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count tours")?;
        Ok(row.get("count"))
    }
}
