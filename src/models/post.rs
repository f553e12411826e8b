//! Post model
//!
//! This module provides:
//! - `Post` entity representing a published story or travel guide
//! - `PostStatus` enum for publication states
//! - `PostQuery` listing criteria and `PageParams` pagination
//! - `PostView` / `PostPage` display DTOs returned by the content service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::CommentView;
use super::taxonomy::{AuthorRef, CategoryRef, TagRef};

/// Post entity as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short teaser shown on listing cards
    pub excerpt: String,
    /// Plain body content
    pub body: String,
    /// Rendered HTML body
    pub body_html: String,
    /// Publication status
    pub status: PostStatus,
    /// Whether the post is featured on listing pages
    pub featured: bool,
    /// Publication timestamp (set when first published)
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// View count
    #[serde(default)]
    pub view_count: i64,
    /// Like count
    #[serde(default)]
    pub like_count: i64,
    /// Comment count
    #[serde(default)]
    pub comment_count: i64,
    /// Raw thumbnail bytes, if uploaded
    #[serde(default)]
    pub thumbnail: Option<Vec<u8>>,
    /// Declared media type of the thumbnail
    #[serde(default)]
    pub thumbnail_type: Option<String>,
    /// SEO title override
    #[serde(default)]
    pub seo_title: Option<String>,
    /// SEO description override
    #[serde(default)]
    pub seo_description: Option<String>,
    /// Owning author ID
    pub author_id: Option<i64>,
    /// Category ID
    pub category_id: Option<i64>,
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - visible to public
    Published,
    /// Archived - hidden but not deleted
    Archived,
}

impl PostStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Invalid post status: {}", s)),
        }
    }
}

impl Default for Post {
    fn default() -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        Self {
            id: 0,
            slug: String::new(),
            title: String::new(),
            excerpt: String::new(),
            body: String::new(),
            body_html: String::new(),
            status: PostStatus::Draft,
            featured: false,
            published_at: None,
            created_at: epoch,
            updated_at: epoch,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            thumbnail: None,
            thumbnail_type: None,
            seo_title: None,
            seo_description: None,
            author_id: None,
            category_id: None,
        }
    }
}

/// A post row together with its joined category and author columns.
///
/// Produced by the repository; flattened into a [`PostView`] by the
/// content service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRecord {
    pub post: Post,
    pub category: Option<CategoryRef>,
    pub author: Option<AuthorRef>,
}

/// Listing criteria for published posts.
///
/// Every field besides `page`/`limit` is optional; absent filters add no
/// clause to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostQuery {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
    /// Category slug filter
    pub category: Option<String>,
    /// Tag slug filter
    pub tag: Option<String>,
    /// Author ID filter
    pub author_id: Option<i64>,
    /// Featured-only (or explicitly non-featured) filter
    pub featured: Option<bool>,
    /// Case-insensitive search over title, excerpt and body
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            category: None,
            tag: None,
            author_id: None,
            featured: None,
            search: None,
        }
    }
}

impl PostQuery {
    /// Normalized pagination parameters for this query
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }

    /// The filter-relevant portion of the query, used to key the count
    /// lookup independently of the requested page.
    pub fn filter_key(&self) -> impl Serialize + '_ {
        (
            &self.category,
            &self.tag,
            self.author_id,
            self.featured,
            &self.search,
        )
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageParams {
    /// Create new pagination parameters, clamping out-of-range values
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.limit) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Display-ready post, with relations flattened and the thumbnail
/// materialized as an inline data URI. Raw thumbnail bytes never leave
/// the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub body_html: String,
    pub status: PostStatus,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    /// `data:<type>;base64,<payload>` string, or None when either the
    /// payload or the declared media type is absent
    pub thumbnail: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub category: Option<CategoryRef>,
    pub author: Option<AuthorRef>,
    pub tags: Vec<TagRef>,
    /// Approved comments, newest first
    pub comments: Vec<CommentView>,
}

/// Paginated listing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    /// Items in the current page
    pub items: Vec<PostView>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether a later page exists
    pub has_more: bool,
}

impl PostPage {
    /// Build a page result, deriving `total_pages` and `has_more`
    pub fn new(items: Vec<PostView>, total: i64, params: PageParams) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (((total as u64) + (params.limit as u64) - 1) / (params.limit as u64)) as u32
        };
        Self {
            items,
            total,
            page: params.page,
            total_pages,
            has_more: params.page < total_pages,
        }
    }

    /// The empty page returned on any store failure
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 0,
            has_more: false,
        }
    }
}

impl Default for PostPage {
    fn default() -> Self {
        Self::empty()
    }
}
