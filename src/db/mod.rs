//! Database layer
//!
//! Connection pool, embedded migrations, the query predicate builder and
//! the per-entity repositories.

pub mod migrations;
pub mod pool;
pub mod query;
pub mod repositories;

pub use pool::{create_test_db, Database, SharedDb};

/// Whether an error chain bottoms out in a "relation does not exist"
/// store condition.
///
/// This happens only against a database that has not been migrated yet;
/// callers downgrade it to a warning and substitute an empty result.
pub fn is_missing_relation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .map_or(false, |sqlx_err| match sqlx_err {
                sqlx::Error::Database(db_err) => {
                    let message = db_err.message();
                    message.contains("no such table") || message.contains("does not exist")
                }
                _ => false,
            })
    })
}
