//! Database migrations
//!
//! Code-based migrations for the Karibu backend. All migrations are
//! embedded as SQL strings for single-binary deployment and recorded in
//! a `schema_migrations` ledger table so each one runs at most once.

use anyhow::{Context, Result};
use sqlx::Row;

use super::pool::Database;

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations for the Karibu backend
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: content reference tables
    Migration {
        version: 1,
        name: "create_content_reference_tables",
        up: r#"
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                slug VARCHAR(100) NOT NULL UNIQUE,
                bio TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                description TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_categories_slug ON categories(slug);
            CREATE INDEX IF NOT EXISTS idx_tags_slug ON tags(slug);
        "#,
    },
    // Migration 2: posts and their relations
    Migration {
        version: 2,
        name: "create_posts",
        up: r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(200) NOT NULL UNIQUE,
                title VARCHAR(300) NOT NULL,
                excerpt TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL DEFAULT '',
                body_html TEXT NOT NULL DEFAULT '',
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                featured BOOLEAN NOT NULL DEFAULT 0,
                published_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                view_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0,
                comment_count INTEGER NOT NULL DEFAULT 0,
                thumbnail BLOB,
                thumbnail_type VARCHAR(100),
                seo_title VARCHAR(300),
                seo_description TEXT,
                author_id INTEGER,
                category_id INTEGER,
                FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE SET NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_posts_slug ON posts(slug);
            CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);
            CREATE INDEX IF NOT EXISTS idx_posts_category_id ON posts(category_id);
            CREATE INDEX IF NOT EXISTS idx_posts_published_at ON posts(published_at);
            CREATE TABLE IF NOT EXISTS post_tags (
                post_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (post_id, tag_id),
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            );
        "#,
    },
    // Migration 3: comments
    Migration {
        version: 3,
        name: "create_comments",
        up: r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_name VARCHAR(100) NOT NULL,
                content TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id);
            CREATE INDEX IF NOT EXISTS idx_comments_status ON comments(status);
        "#,
    },
    // Migration 4: booking-side tables
    Migration {
        version: 4,
        name: "create_booking_tables",
        up: r#"
            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(200) NOT NULL,
                email VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS tours (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(200) NOT NULL UNIQUE,
                name VARCHAR(300) NOT NULL,
                price REAL NOT NULL DEFAULT 0,
                rating REAL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tour_id INTEGER NOT NULL,
                customer_id INTEGER,
                reference VARCHAR(40) NOT NULL UNIQUE,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                total_amount REAL NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (tour_id) REFERENCES tours(id) ON DELETE CASCADE,
                FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bookings_tour_id ON bookings(tour_id);
            CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
            CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at);
        "#,
    },
    // Migration 5: engagement tables
    Migration {
        version: 5,
        name: "create_engagement_tables",
        up: r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tour_id INTEGER NOT NULL,
                reviewer_name VARCHAR(200) NOT NULL,
                rating INTEGER NOT NULL,
                content TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (tour_id) REFERENCES tours(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS inquiries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(200) NOT NULL,
                email VARCHAR(255) NOT NULL,
                subject VARCHAR(300) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews(created_at);
            CREATE INDEX IF NOT EXISTS idx_inquiries_created_at ON inquiries(created_at);
        "#,
    },
];

/// Run all pending migrations in version order
pub async fn run_migrations(db: &Database) -> Result<()> {
    create_migrations_table(db).await?;

    let applied = applied_versions(db).await?;

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        apply(db, migration)
            .await
            .with_context(|| format!("Failed to apply migration {}", migration.name))?;
    }

    Ok(())
}

async fn create_migrations_table(db: &Database) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(db.pool())
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn applied_versions(db: &Database) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(db.pool())
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|row| row.get("version")).collect())
}

async fn apply(db: &Database, migration: &Migration) -> Result<()> {
    // SQLite executes one statement per call; split on the statement
    // terminator at line ends.
    for statement in migration.up.split(";\n") {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .with_context(|| format!("Failed statement in migration {}", migration.name))?;
    }

    sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(db.pool())
        .await
        .context("Failed to record migration")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::create_test_db;

    #[tokio::test]
    async fn test_migrations_run_cleanly() {
        let db = create_test_db().await.unwrap();
        run_migrations(&db).await.unwrap();

        // Every table is queryable afterwards
        for table in [
            "authors",
            "categories",
            "tags",
            "posts",
            "post_tags",
            "comments",
            "customers",
            "tours",
            "bookings",
            "reviews",
            "inquiries",
            "subscribers",
        ] {
            let sql = format!("SELECT COUNT(*) AS count FROM {}", table);
            let row = sqlx::query(&sql).fetch_one(db.pool()).await.unwrap();
            let count: i64 = row.get("count");
            assert_eq!(count, 0, "table {} should exist and be empty", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = create_test_db().await.unwrap();
        run_migrations(&db).await.unwrap();
        run_migrations(&db).await.unwrap();

        let row = sqlx::query("SELECT COUNT(*) AS count FROM schema_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_versions_are_sequential() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, index as i32 + 1);
        }
    }
}
