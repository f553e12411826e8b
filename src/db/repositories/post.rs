//! Post repository
//!
//! Read-path database operations for posts. Listing queries take a
//! caller-composed [`Filter`] so every entry point (by category, by tag,
//! by author, search) shares one SQL shape, one ordering and one
//! flattening path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::query::{bind_args, Filter};
use crate::db::SharedDb;
use crate::models::{AuthorRef, CategoryRef, Post, PostRecord};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch one page of posts matching the filter, ordered featured
    /// first, then publish date, then creation date, all descending
    async fn find_page(&self, filter: &Filter, limit: i64, offset: i64)
        -> Result<Vec<PostRecord>>;

    /// Count all posts matching the filter
    async fn count(&self, filter: &Filter) -> Result<i64>;

    /// Fetch a single published post by slug
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostRecord>>;

    /// Fetch published posts related to the given one: the post itself is
    /// excluded, same-category posts come first, then featured, most
    /// viewed and most recently published
    async fn find_related(
        &self,
        exclude_id: i64,
        category_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PostRecord>>;

    /// Increment the view counter by exactly one
    async fn increment_view_count(&self, id: i64) -> Result<()>;
}

/// Shared select list and joins for every post read path
const SELECT_POST: &str = r#"
SELECT p.id, p.slug, p.title, p.excerpt, p.body, p.body_html, p.status,
       p.featured, p.published_at, p.created_at, p.updated_at,
       p.view_count, p.like_count, p.comment_count,
       p.thumbnail, p.thumbnail_type, p.seo_title, p.seo_description,
       p.author_id, p.category_id,
       c.slug AS category_slug, c.name AS category_name,
       a.name AS author_name, a.slug AS author_slug
FROM posts p
LEFT JOIN categories c ON c.id = p.category_id
LEFT JOIN authors a ON a.id = p.author_id
"#;

const LISTING_ORDER: &str =
    "ORDER BY p.featured DESC, p.published_at DESC, p.created_at DESC";

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    db: SharedDb,
}

impl SqlxPostRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(db: SharedDb) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn find_page(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRecord>> {
        let sql = format!(
            "{} {} {} LIMIT ? OFFSET ?",
            SELECT_POST,
            filter.where_clause(),
            LISTING_ORDER
        );

        let rows = bind_args(sqlx::query(&sql), filter.args())
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await
            .context("Failed to list posts")?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn count(&self, filter: &Filter) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM posts p
             LEFT JOIN categories c ON c.id = p.category_id
             LEFT JOIN authors a ON a.id = p.author_id
             {}",
            filter.where_clause()
        );

        let row = bind_args(sqlx::query(&sql), filter.args())
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count posts")?;

        Ok(row.get("count"))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let sql = format!("{} WHERE p.slug = ? AND p.status = 'published'", SELECT_POST);

        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(self.db.pool())
            .await
            .context("Failed to get post by slug")?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn find_related(
        &self,
        exclude_id: i64,
        category_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PostRecord>> {
        let rows = match category_id {
            Some(category_id) => {
                let sql = format!(
                    "{} WHERE p.status = 'published' AND p.id != ?
                     ORDER BY CASE WHEN p.category_id = ? THEN 0 ELSE 1 END,
                              p.featured DESC, p.view_count DESC, p.published_at DESC
                     LIMIT ?",
                    SELECT_POST
                );
                sqlx::query(&sql)
                    .bind(exclude_id)
                    .bind(category_id)
                    .bind(limit)
                    .fetch_all(self.db.pool())
                    .await
            }
            None => {
                let sql = format!(
                    "{} WHERE p.status = 'published' AND p.id != ?
                     ORDER BY p.featured DESC, p.view_count DESC, p.published_at DESC
                     LIMIT ?",
                    SELECT_POST
                );
                sqlx::query(&sql)
                    .bind(exclude_id)
                    .bind(limit)
                    .fetch_all(self.db.pool())
                    .await
            }
        }
        .context("Failed to find related posts")?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn increment_view_count(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await
            .context("Failed to increment view count")?;
        Ok(())
    }
}

fn row_to_record(row: &SqliteRow) -> PostRecord {
    let category = match (
        row.get::<Option<i64>, _>("category_id"),
        row.get::<Option<String>, _>("category_slug"),
        row.get::<Option<String>, _>("category_name"),
    ) {
        (Some(id), Some(slug), Some(name)) => Some(CategoryRef { id, slug, name }),
        _ => None,
    };

    let author = match (
        row.get::<Option<i64>, _>("author_id"),
        row.get::<Option<String>, _>("author_name"),
        row.get::<Option<String>, _>("author_slug"),
    ) {
        (Some(id), Some(name), Some(slug)) => Some(AuthorRef { id, name, slug }),
        _ => None,
    };

    let status: String = row.get("status");

    PostRecord {
        post: Post {
            id: row.get("id"),
            slug: row.get("slug"),
            title: row.get("title"),
            excerpt: row.get("excerpt"),
            body: row.get("body"),
            body_html: row.get("body_html"),
            status: status.parse().unwrap_or_default(),
            featured: row.get("featured"),
            published_at: row.get("published_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            view_count: row.get("view_count"),
            like_count: row.get("like_count"),
            comment_count: row.get("comment_count"),
            thumbnail: row.get("thumbnail"),
            thumbnail_type: row.get("thumbnail_type"),
            seo_title: row.get("seo_title"),
            seo_description: row.get("seo_description"),
            author_id: row.get("author_id"),
            category_id: row.get("category_id"),
        },
        category,
        author,
    }
}
