//! Category, tag and author reference entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category with a denormalized count of published posts, for listing UIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    /// Number of published posts in this category
    pub published_posts: i64,
}

impl CategoryWithCount {
    pub fn new(category: Category, published_posts: i64) -> Self {
        Self {
            category,
            published_posts,
        }
    }
}

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Tag with a denormalized count of published posts, for listing UIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of published posts carrying this tag
    pub published_posts: i64,
}

impl TagWithCount {
    pub fn new(tag: Tag, published_posts: i64) -> Self {
        Self {
            tag,
            published_posts,
        }
    }
}

/// Flattened category fields embedded in a post view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// Flattened author fields embedded in a post view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Flattened tag fields embedded in a post view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl From<Tag> for TagRef {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            slug: tag.slug,
            name: tag.name,
        }
    }
}
