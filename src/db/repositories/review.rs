//! Review repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::RecentReview;

/// Review repository trait
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Most recent reviews with their tour names, newest first
    async fn recent(&self, limit: i64) -> Result<Vec<RecentReview>>;
}

/// SQLx-based review repository implementation
pub struct SqlxReviewRepository {
    db: SharedDb,
}

impl SqlxReviewRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn ReviewRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn recent(&self, limit: i64) -> Result<Vec<RecentReview>> {
        let rows = sqlx::query(
            r#"
            SELECT r.reviewer_name, r.rating, r.created_at, t.name AS tour_name
            FROM reviews r
            LEFT JOIN tours t ON t.id = r.tour_id
            ORDER BY r.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list recent reviews")?;

        Ok(rows
            .iter()
            .map(|row| RecentReview {
                reviewer_name: row.get("reviewer_name"),
                rating: row.get("rating"),
                tour_name: row.get("tour_name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
