//! Content query service
//!
//! Builds filter predicates from caller-supplied criteria, issues
//! paginated queries, flattens relational joins into display-ready
//! shapes and reports pagination metadata. Every listing entry point
//! (by category, by tag, by author, featured, search) is a parameter
//! preset over the same pipeline, so filtering, ordering and flattening
//! can never diverge between pages.
//!
//! The service never raises: any store failure degrades to an empty
//! result (see [`crate::services::fetch_or`]).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;

use super::fetch_or;

use crate::cache::RequestMemo;
use crate::db::query::{Arg, Filter, Predicate};
use crate::db::repositories::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository,
};
use crate::models::{
    CategoryWithCount, CommentView, PostPage, PostQuery, PostRecord, PostStatus, PostView,
    TagWithCount,
};

/// Subquery used for the tag filter: the post carries a tag with the
/// bound slug.
const TAGGED_WITH: &str =
    "SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id
     WHERE pt.post_id = p.id AND t.slug = ?";

/// Content query service for the public site
pub struct ContentService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl ContentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
            comments,
        }
    }

    /// List published posts matching the query.
    ///
    /// The page fetch and the total count share one predicate and are
    /// issued concurrently.
    pub async fn list(&self, query: &PostQuery, memo: &RequestMemo) -> PostPage {
        let params = query.params();
        let filter = build_filter(query);
        let count_key = query.filter_key();

        let (records, total) = tokio::join!(
            memo.get_or_compute("posts.page", query, || async {
                fetch_or(
                    "posts.page",
                    Vec::new(),
                    self.posts
                        .find_page(&filter, params.limit(), params.offset()),
                )
                .await
            }),
            memo.get_or_compute("posts.count", &count_key, || async {
                fetch_or("posts.count", 0, self.posts.count(&filter)).await
            }),
        );

        if total == 0 {
            return PostPage::empty();
        }

        let items = self.hydrate_all(records, memo).await;
        PostPage::new(items, total, params)
    }

    /// Posts in a category, identified by slug
    pub async fn by_category(
        &self,
        slug: &str,
        page: u32,
        limit: u32,
        memo: &RequestMemo,
    ) -> PostPage {
        let query = PostQuery {
            page,
            limit,
            category: Some(slug.to_string()),
            ..PostQuery::default()
        };
        self.list(&query, memo).await
    }

    /// Posts carrying a tag, identified by slug
    pub async fn by_tag(&self, slug: &str, page: u32, limit: u32, memo: &RequestMemo) -> PostPage {
        let query = PostQuery {
            page,
            limit,
            tag: Some(slug.to_string()),
            ..PostQuery::default()
        };
        self.list(&query, memo).await
    }

    /// Posts by an author
    pub async fn by_author(
        &self,
        author_id: i64,
        page: u32,
        limit: u32,
        memo: &RequestMemo,
    ) -> PostPage {
        let query = PostQuery {
            page,
            limit,
            author_id: Some(author_id),
            ..PostQuery::default()
        };
        self.list(&query, memo).await
    }

    /// Featured posts only
    pub async fn featured(&self, page: u32, limit: u32, memo: &RequestMemo) -> PostPage {
        let query = PostQuery {
            page,
            limit,
            featured: Some(true),
            ..PostQuery::default()
        };
        self.list(&query, memo).await
    }

    /// Fetch a single published post by slug.
    ///
    /// Records the view as a best-effort side effect: the increment runs
    /// on its own task, its failure is logged and discarded, and it never
    /// delays the read.
    pub async fn get_by_slug(&self, slug: &str, memo: &RequestMemo) -> Option<PostView> {
        let record = self.record_by_slug(slug, memo).await?;

        let posts = Arc::clone(&self.posts);
        let post_id = record.post.id;
        tokio::spawn(async move {
            if let Err(err) = posts.increment_view_count(post_id).await {
                tracing::warn!(post_id, error = %err, "failed to record post view");
            }
        });

        Some(self.hydrate(record, memo).await)
    }

    /// Published posts related to the one identified by slug: same
    /// category preferred, the post itself excluded.
    pub async fn related(&self, slug: &str, limit: u32, memo: &RequestMemo) -> Vec<PostView> {
        let Some(record) = self.record_by_slug(slug, memo).await else {
            return Vec::new();
        };

        let limit = limit.clamp(1, 20) as i64;
        let records = memo
            .get_or_compute("posts.related", &(record.post.id, limit), || async {
                fetch_or(
                    "posts.related",
                    Vec::new(),
                    self.posts
                        .find_related(record.post.id, record.post.category_id, limit),
                )
                .await
            })
            .await;

        self.hydrate_all(records, memo).await
    }

    /// Categories with published-post counts
    pub async fn categories(&self, memo: &RequestMemo) -> Vec<CategoryWithCount> {
        memo.get_or_compute("categories.list", &(), || async {
            fetch_or(
                "categories.list",
                Vec::new(),
                self.categories.list_with_counts(),
            )
            .await
        })
        .await
    }

    /// Tags with published-post counts
    pub async fn tags(&self, memo: &RequestMemo) -> Vec<TagWithCount> {
        memo.get_or_compute("tags.list", &(), || async {
            fetch_or("tags.list", Vec::new(), self.tags.list_with_counts()).await
        })
        .await
    }

    async fn record_by_slug(&self, slug: &str, memo: &RequestMemo) -> Option<PostRecord> {
        memo.get_or_compute("posts.by_slug", slug, || async {
            fetch_or(
                "posts.by_slug",
                None,
                self.posts.find_published_by_slug(slug),
            )
            .await
        })
        .await
    }

    async fn hydrate_all(&self, records: Vec<PostRecord>, memo: &RequestMemo) -> Vec<PostView> {
        futures::future::join_all(
            records
                .into_iter()
                .map(|record| self.hydrate(record, memo)),
        )
        .await
    }

    /// Attach tags and approved comments, then flatten into the outward DTO
    async fn hydrate(&self, record: PostRecord, memo: &RequestMemo) -> PostView {
        let post_id = record.post.id;

        let (tags, comments) = tokio::join!(
            memo.get_or_compute("tags.for_post", &post_id, || async {
                fetch_or("tags.for_post", Vec::new(), self.tags.for_post(post_id)).await
            }),
            memo.get_or_compute("comments.for_post", &post_id, || async {
                fetch_or(
                    "comments.for_post",
                    Vec::new(),
                    self.comments.approved_for_post(post_id),
                )
                .await
            }),
        );

        flatten(record, tags, comments)
    }
}

/// Compose the WHERE predicate for a listing query. Only published posts
/// are ever visible; each present criterion adds one conjunctive clause.
fn build_filter(query: &PostQuery) -> Filter {
    let mut filter = Filter::new().and(Predicate::Equals(
        "p.status",
        Arg::text(PostStatus::Published.as_str()),
    ));

    if let Some(category) = &query.category {
        filter.push(Predicate::Equals("c.slug", Arg::text(category)));
    }
    if let Some(tag) = &query.tag {
        filter.push(Predicate::Exists(TAGGED_WITH, Arg::text(tag)));
    }
    if let Some(author_id) = query.author_id {
        filter.push(Predicate::Equals("p.author_id", Arg::Int(author_id)));
    }
    if let Some(featured) = query.featured {
        filter.push(Predicate::Equals("p.featured", Arg::Bool(featured)));
    }
    if let Some(search) = &query.search {
        let needle = search.trim();
        if !needle.is_empty() {
            filter.push(Predicate::AnyContains(
                &["p.title", "p.excerpt", "p.body"],
                needle.to_string(),
            ));
        }
    }

    filter
}

/// Reshape a joined record into the flat display DTO. Raw thumbnail
/// bytes are replaced by an inline data URI and never leave this layer.
fn flatten(
    record: PostRecord,
    tags: Vec<crate::models::Tag>,
    comments: Vec<crate::models::Comment>,
) -> PostView {
    let post = record.post;
    let thumbnail = thumbnail_data_uri(post.thumbnail.as_deref(), post.thumbnail_type.as_deref());

    PostView {
        id: post.id,
        slug: post.slug,
        title: post.title,
        excerpt: post.excerpt,
        body: post.body,
        body_html: post.body_html,
        status: post.status,
        featured: post.featured,
        published_at: post.published_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
        view_count: post.view_count,
        like_count: post.like_count,
        comment_count: post.comment_count,
        thumbnail,
        seo_title: post.seo_title,
        seo_description: post.seo_description,
        category: record.category,
        author: record.author,
        tags: tags.into_iter().map(Into::into).collect(),
        comments: comments.into_iter().map(CommentView::from).collect(),
    }
}

/// Build a `data:<type>;base64,<payload>` URI, or None when either part
/// is absent
fn thumbnail_data_uri(payload: Option<&[u8]>, media_type: Option<&str>) -> Option<String> {
    match (payload, media_type) {
        (Some(bytes), Some(media_type)) => Some(format!(
            "data:{};base64,{}",
            media_type,
            BASE64.encode(bytes)
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_db;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository, SqlxTagRepository,
    };
    use crate::db::test_support::{
        attach_tag, days_ago, seed_category, seed_comment, seed_post, seed_tag, setup_db,
        PostSeed,
    };
    use crate::db::SharedDb;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn service_over(db: SharedDb) -> ContentService {
        ContentService::new(
            SqlxPostRepository::boxed(db.clone()),
            SqlxCategoryRepository::boxed(db.clone()),
            SqlxTagRepository::boxed(db.clone()),
            SqlxCommentRepository::boxed(db),
        )
    }

    #[test]
    fn test_thumbnail_data_uri_round_trip() {
        use base64::Engine;

        let payload = b"fake-png-bytes";
        let uri = thumbnail_data_uri(Some(payload), Some("image/png")).unwrap();
        assert_eq!(
            uri,
            format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(payload)
            )
        );

        assert!(thumbnail_data_uri(Some(payload), None).is_none());
        assert!(thumbnail_data_uri(None, Some("image/png")).is_none());
        assert!(thumbnail_data_uri(None, None).is_none());
    }

    #[test]
    fn test_filter_omits_absent_criteria() {
        let query = PostQuery::default();
        let filter = build_filter(&query);
        assert_eq!(filter.where_clause(), "WHERE p.status = ?");

        let query = PostQuery {
            category: Some("gorillas".into()),
            search: Some("  ".into()),
            ..PostQuery::default()
        };
        let filter = build_filter(&query);
        // Blank search adds no clause
        assert_eq!(filter.where_clause(), "WHERE p.status = ? AND c.slug = ?");
    }

    #[tokio::test]
    async fn test_list_flattens_relations() {
        let db = setup_db().await;
        let category = seed_category(&db, "gorillas", "Gorilla Treks").await;
        let wildlife = seed_tag(&db, "wildlife", "Wildlife").await;

        let mut seed = PostSeed::published("bwindi-guide");
        seed.category_id = Some(category);
        let post_id = seed_post(&db, seed).await;
        attach_tag(&db, post_id, wildlife).await;
        seed_comment(&db, post_id, "Amina", "approved", days_ago(1)).await;
        seed_comment(&db, post_id, "Spammer", "spam", days_ago(0)).await;

        let service = service_over(db);
        let memo = RequestMemo::new();
        let page = service.list(&PostQuery::default(), &memo).await;

        assert_eq!(page.total, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more);

        let view = &page.items[0];
        assert_eq!(view.category.as_ref().map(|c| c.slug.as_str()), Some("gorillas"));
        assert_eq!(view.tags.len(), 1);
        assert_eq!(view.tags[0].slug, "wildlife");
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].author_name, "Amina");
        assert!(view.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_list_materializes_thumbnails() {
        let db = setup_db().await;
        let post_id = seed_post(&db, PostSeed::published("with-thumb")).await;
        sqlx::query("UPDATE posts SET thumbnail = ?, thumbnail_type = ? WHERE id = ?")
            .bind(b"tiny".as_slice())
            .bind("image/webp")
            .bind(post_id)
            .execute(db.pool())
            .await
            .unwrap();

        let service = service_over(db);
        let memo = RequestMemo::new();
        let page = service.list(&PostQuery::default(), &memo).await;

        let uri = page.items[0].thumbnail.as_deref().unwrap();
        assert!(uri.starts_with("data:image/webp;base64,"));
    }

    #[tokio::test]
    async fn test_unmigrated_store_degrades_to_empty() {
        // No migrations have been run against this database
        let db = create_test_db().await.unwrap();
        let service = service_over(db);
        let memo = RequestMemo::new();

        let page = service
            .list(
                &PostQuery {
                    page: 3,
                    ..PostQuery::default()
                },
                &memo,
            )
            .await;
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_more);

        assert!(service.get_by_slug("anything", &memo).await.is_none());
        assert!(service.categories(&memo).await.is_empty());
        assert!(service.tags(&memo).await.is_empty());
        assert!(service.related("anything", 3, &memo).await.is_empty());
    }

    #[tokio::test]
    async fn test_entry_points_share_the_pipeline() {
        let db = setup_db().await;
        let category = seed_category(&db, "lakes", "Lakes").await;
        let tag = seed_tag(&db, "budget", "Budget").await;

        let mut seed = PostSeed::published("kivu-on-a-budget");
        seed.category_id = Some(category);
        let post_id = seed_post(&db, seed).await;
        attach_tag(&db, post_id, tag).await;
        seed_post(&db, PostSeed::published("unrelated")).await;

        let service = service_over(db);
        let memo = RequestMemo::new();

        let by_category = service.by_category("lakes", 1, 10, &memo).await;
        assert_eq!(by_category.total, 1);
        assert_eq!(by_category.items[0].slug, "kivu-on-a-budget");

        let by_tag = service.by_tag("budget", 1, 10, &memo).await;
        assert_eq!(by_tag.total, 1);
        assert_eq!(by_tag.items[0].slug, "kivu-on-a-budget");

        let featured = service.featured(1, 10, &memo).await;
        assert_eq!(featured.total, 0);
    }

    #[tokio::test]
    async fn test_get_by_slug_records_a_view() {
        let db = setup_db().await;
        let post_id = seed_post(&db, PostSeed::published("counted")).await;

        let service = service_over(db.clone());
        let memo = RequestMemo::new();

        let view = service.get_by_slug("counted", &memo).await;
        assert!(view.is_some());

        // The increment runs on its own task; give it a moment
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let row = sqlx::query("SELECT view_count FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        use sqlx::Row;
        assert_eq!(row.get::<i64, _>("view_count"), 1);
    }

    /// Counting stub around the post repository, for memoization and
    /// side-effect tests
    struct CountingPosts {
        page_calls: AtomicUsize,
        increment_calls: AtomicUsize,
        fail_increment: bool,
    }

    impl CountingPosts {
        fn new(fail_increment: bool) -> Self {
            Self {
                page_calls: AtomicUsize::new(0),
                increment_calls: AtomicUsize::new(0),
                fail_increment,
            }
        }

        fn record() -> PostRecord {
            let mut record = PostRecord::default();
            record.post.id = 1;
            record.post.slug = "stubbed".to_string();
            record.post.status = PostStatus::Published;
            record
        }
    }

    #[async_trait]
    impl crate::db::repositories::PostRepository for CountingPosts {
        async fn find_page(
            &self,
            _filter: &Filter,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<PostRecord>> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Self::record()])
        }

        async fn count(&self, _filter: &Filter) -> Result<i64> {
            Ok(1)
        }

        async fn find_published_by_slug(&self, _slug: &str) -> Result<Option<PostRecord>> {
            Ok(Some(Self::record()))
        }

        async fn find_related(
            &self,
            _exclude_id: i64,
            _category_id: Option<i64>,
            _limit: i64,
        ) -> Result<Vec<PostRecord>> {
            Ok(Vec::new())
        }

        async fn increment_view_count(&self, _id: i64) -> Result<()> {
            self.increment_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_increment {
                anyhow::bail!("disk full");
            }
            Ok(())
        }
    }

    async fn stub_service(posts: Arc<CountingPosts>) -> ContentService {
        let db = setup_db().await;
        ContentService::new(
            posts,
            SqlxCategoryRepository::boxed(db.clone()),
            SqlxTagRepository::boxed(db.clone()),
            SqlxCommentRepository::boxed(db),
        )
    }

    #[tokio::test]
    async fn test_identical_listings_hit_the_store_once_per_request() {
        let posts = Arc::new(CountingPosts::new(false));
        let service = stub_service(posts.clone()).await;
        let memo = RequestMemo::new();

        let query = PostQuery::default();
        service.list(&query, &memo).await;
        service.list(&query, &memo).await;
        assert_eq!(posts.page_calls.load(Ordering::SeqCst), 1);

        // A fresh request computes again
        let fresh = RequestMemo::new();
        service.list(&query, &fresh).await;
        assert_eq!(posts.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_view_increment_does_not_fail_the_read() {
        let posts = Arc::new(CountingPosts::new(true));
        let service = stub_service(posts.clone()).await;
        let memo = RequestMemo::new();

        let view = service.get_by_slug("stubbed", &memo).await;
        assert!(view.is_some());

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(posts.increment_calls.load(Ordering::SeqCst), 1);
    }
}
