//! Comment repository
//!
//! Only approved comments are ever read by this layer; moderation writes
//! happen in the admin back-office, outside this crate.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::Comment;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Approved comments for a post, newest first
    async fn approved_for_post(&self, post_id: i64) -> Result<Vec<Comment>>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    db: SharedDb,
}

impl SqlxCommentRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn approved_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_name, content, status, created_at
            FROM comments
            WHERE post_id = ? AND status = 'approved'
            ORDER BY created_at DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await
        .context("Failed to get comments for post")?;

        Ok(rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_name: row.get("author_name"),
                content: row.get("content"),
                status: row.get::<String, _>("status").parse().unwrap_or_default(),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
