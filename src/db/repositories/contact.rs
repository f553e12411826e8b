//! Inquiry and subscriber repositories
//!
//! Both tables are written by the public contact and newsletter forms;
//! this layer only counts them and surfaces recent inquiries in the
//! activity feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::Inquiry;

/// Inquiry repository trait
#[async_trait]
pub trait InquiryRepository: Send + Sync {
    /// Most recent inquiries, newest first
    async fn recent(&self, limit: i64) -> Result<Vec<Inquiry>>;

    /// Total number of inquiries
    async fn count(&self) -> Result<i64>;
}

/// Subscriber repository trait
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Total number of newsletter subscribers
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based inquiry repository implementation
pub struct SqlxInquiryRepository {
    db: SharedDb,
}

impl SqlxInquiryRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn InquiryRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl InquiryRepository for SqlxInquiryRepository {
    async fn recent(&self, limit: i64) -> Result<Vec<Inquiry>> {
        let rows = sqlx::query(
            "SELECT id, name, email, subject, created_at FROM inquiries
             ORDER BY created_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list recent inquiries")?;

        Ok(rows
            .iter()
            .map(|row| Inquiry {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                subject: row.get("subject"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM inquiries")
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count inquiries")?;
        Ok(row.get("count"))
    }
}

/// SQLx-based subscriber repository implementation
pub struct SqlxSubscriberRepository {
    db: SharedDb,
}

impl SqlxSubscriberRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn SubscriberRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl SubscriberRepository for SqlxSubscriberRepository {
    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM subscribers")
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count subscribers")?;
        Ok(row.get("count"))
    }
}
