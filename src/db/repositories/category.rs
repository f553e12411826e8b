//! Category repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::{Category, CategoryWithCount};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List all categories with their published-post counts, most
    /// populated first
    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    db: SharedDb,
}

impl SqlxCategoryRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.slug, c.name, c.description, c.created_at,
                   COUNT(p.id) AS published_posts
            FROM categories c
            LEFT JOIN posts p ON p.category_id = c.id AND p.status = 'published'
            GROUP BY c.id
            ORDER BY published_posts DESC, c.name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list categories")?;

        Ok(rows
            .iter()
            .map(|row| {
                let category = Category {
                    id: row.get("id"),
                    slug: row.get("slug"),
                    name: row.get("name"),
                    description: row.get("description"),
                    created_at: row.get("created_at"),
                };
                CategoryWithCount::new(category, row.get("published_posts"))
            })
            .collect())
    }
}
