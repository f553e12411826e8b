//! Tag repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use sqlx::Row;

use crate::db::SharedDb;
use crate::models::{Tag, TagWithCount};

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List all tags with their published-post counts, most used first
    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>>;

    /// Tags attached to a post
    async fn for_post(&self, post_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    db: SharedDb,
}

impl SqlxTagRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at,
                   COUNT(p.id) AS published_posts
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            LEFT JOIN posts p ON p.id = pt.post_id AND p.status = 'published'
            GROUP BY t.id
            ORDER BY published_posts DESC, t.name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list tags")?;

        Ok(rows
            .iter()
            .map(|row| {
                let tag = Tag {
                    id: row.get("id"),
                    slug: row.get("slug"),
                    name: row.get("name"),
                    created_at: row.get("created_at"),
                };
                TagWithCount::new(tag, row.get("published_posts"))
            })
            .collect())
    }

    async fn for_post(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at
            FROM tags t
            JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await
        .context("Failed to get tags for post")?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{attach_tag, seed_post, seed_tag, setup_db, PostSeed};

    #[tokio::test]
    async fn test_for_post_returns_attached_tags() {
        let db = setup_db().await;
        let post = seed_post(&db, PostSeed::published("tagged")).await;
        let wildlife = seed_tag(&db, "wildlife", "Wildlife").await;
        let budget = seed_tag(&db, "budget", "Budget").await;
        seed_tag(&db, "unused", "Unused").await;
        attach_tag(&db, post, wildlife).await;
        attach_tag(&db, post, budget).await;

        let repo = SqlxTagRepository::new(db);
        let tags = repo.for_post(post).await.unwrap();
        let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();

        assert_eq!(slugs, vec!["budget", "wildlife"]);
    }

    #[tokio::test]
    async fn test_counts_ignore_drafts() {
        let db = setup_db().await;
        let wildlife = seed_tag(&db, "wildlife", "Wildlife").await;

        let published = seed_post(&db, PostSeed::published("live")).await;
        let draft = seed_post(&db, PostSeed::draft("pending")).await;
        attach_tag(&db, published, wildlife).await;
        attach_tag(&db, draft, wildlife).await;

        let repo = SqlxTagRepository::new(db);
        let listed = repo.list_with_counts().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].published_posts, 1);
    }
}
