//! Customer repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;

/// Customer repository trait
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Number of customers who signed up in `[start, end)`
    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64>;

    /// Total number of customers
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based customer repository implementation
pub struct SqlxCustomerRepository {
    db: SharedDb,
}

impl SqlxCustomerRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn CustomerRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl CustomerRepository for SqlxCustomerRepository {
    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM customers
             WHERE created_at >= ? AND created_at < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.db.pool())
        .await
        .context("Failed to count new customers")?;

        Ok(row.get("count"))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM customers")
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count customers")?;
        Ok(row.get("count"))
    }
}
