//! Booking repository
//!
//! Aggregate read queries over the bookings table. Revenue metrics only
//! count money-bearing statuses (confirmed, completed); booking counts
//! cover every booking created in the window.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use sqlx::Row;

use crate::db::query::{bind_args, Arg, Filter, Predicate};
use crate::db::SharedDb;
use crate::models::{BookingStatus, MonthlyPoint, RecentBooking, TourRank};

/// Filter for bookings that contribute to revenue, created in `[start, end)`
fn revenue_filter(start: DateTime<Utc>, end: DateTime<Utc>) -> Filter {
    Filter::new()
        .and(Predicate::InSet(
            "status",
            vec![
                Arg::text(BookingStatus::Confirmed.as_str()),
                Arg::text(BookingStatus::Completed.as_str()),
            ],
        ))
        .and(Predicate::Between(
            "created_at",
            Arg::Date(start),
            Arg::Date(end),
        ))
}

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Sum of confirmed/completed booking amounts created in `[start, end)`
    async fn revenue_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64>;

    /// Number of bookings created in `[start, end)`
    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64>;

    /// Bookings grouped by tour over `[start, end)`, ordered by summed
    /// revenue descending, limited to `limit` rows
    async fn top_tours_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TourRank>>;

    /// Most recent bookings with their tour names, newest first
    async fn recent(&self, limit: i64) -> Result<Vec<RecentBooking>>;

    /// Per-month revenue and booking counts since the given instant
    async fn monthly_series(&self, since: DateTime<Utc>) -> Result<Vec<MonthlyPoint>>;
}

/// SQLx-based booking repository implementation
pub struct SqlxBookingRepository {
    db: SharedDb,
}

impl SqlxBookingRepository {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn boxed(db: SharedDb) -> Arc<dyn BookingRepository> {
        Arc::new(Self::new(db))
    }
}

#[async_trait]
impl BookingRepository for SqlxBookingRepository {
    async fn revenue_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64> {
        let filter = revenue_filter(start, end);
        let sql = format!(
            "SELECT SUM(total_amount) AS revenue FROM bookings {}",
            filter.where_clause()
        );
        let row = bind_args(sqlx::query(&sql), filter.args())
            .fetch_one(self.db.pool())
            .await
            .context("Failed to sum booking revenue")?;

        // SUM over zero rows is NULL; normalize before it leaves the store layer
        Ok(row.get::<Option<f64>, _>("revenue").unwrap_or(0.0))
    }

    async fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let filter = Filter::new().and(Predicate::Between(
            "created_at",
            Arg::Date(start),
            Arg::Date(end),
        ));
        let sql = format!(
            "SELECT COUNT(*) AS count FROM bookings {}",
            filter.where_clause()
        );
        let row = bind_args(sqlx::query(&sql), filter.args())
            .fetch_one(self.db.pool())
            .await
            .context("Failed to count bookings")?;

        Ok(row.get("count"))
    }

    async fn top_tours_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TourRank>> {
        let filter = revenue_filter(start, end);
        let sql = format!(
            "SELECT tour_id, COUNT(*) AS bookings, SUM(total_amount) AS revenue
             FROM bookings
             {}
             GROUP BY tour_id
             ORDER BY revenue DESC
             LIMIT ?",
            filter.where_clause()
        );
        let rows = bind_args(sqlx::query(&sql), filter.args())
            .bind(limit)
            .fetch_all(self.db.pool())
            .await
            .context("Failed to rank tours by bookings")?;

        Ok(rows
            .iter()
            .map(|row| TourRank {
                tour_id: row.get("tour_id"),
                bookings: row.get("bookings"),
                revenue: row.get::<Option<f64>, _>("revenue").unwrap_or(0.0),
            })
            .collect())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<RecentBooking>> {
        let rows = sqlx::query(
            r#"
            SELECT b.reference, b.total_amount, b.created_at, t.name AS tour_name
            FROM bookings b
            LEFT JOIN tours t ON t.id = b.tour_id
            ORDER BY b.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .context("Failed to list recent bookings")?;

        Ok(rows
            .iter()
            .map(|row| RecentBooking {
                reference: row.get("reference"),
                tour_name: row.get("tour_name"),
                amount: row.get("total_amount"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn monthly_series(&self, since: DateTime<Utc>) -> Result<Vec<MonthlyPoint>> {
        let sql = format!(
            "SELECT strftime('%Y-%m', created_at) AS month,
                    SUM(CASE WHEN status IN ('{}', '{}') THEN total_amount ELSE 0 END) AS revenue,
                    COUNT(*) AS bookings
             FROM bookings
             WHERE created_at >= ?
             GROUP BY month
             ORDER BY month ASC",
            BookingStatus::Confirmed,
            BookingStatus::Completed
        );
        let rows = sqlx::query(&sql)
            .bind(since)
            .fetch_all(self.db.pool())
            .await
            .context("Failed to build monthly booking series")?;

        Ok(rows
            .iter()
            .map(|row| MonthlyPoint {
                month: row.get("month"),
                revenue: row.get::<Option<f64>, _>("revenue").unwrap_or(0.0),
                bookings: row.get("bookings"),
            })
            .collect())
    }
}
