//! Analytics aggregation service
//!
//! Builds the admin dashboard report: headline stats with
//! period-over-period deltas, top tours ranked by revenue and hydrated
//! with tour details, a merged recent-activity feed and site-wide
//! totals. All constituent queries are issued concurrently and each one
//! is individually wrapped, so a single slow or broken metric degrades
//! to its zero value without blanking the rest of the report.

use std::sync::Arc;

use crate::cache::RequestMemo;
use crate::db::repositories::{
    BookingRepository, CustomerRepository, InquiryRepository, ReviewRepository,
    SubscriberRepository, TourRepository,
};
use crate::models::{
    ActivityEvent, ActivityKind, DashboardReport, Inquiry, MonthlyPoint, RankedTour,
    RecentBooking, RecentReview, ReportWindow, SiteTotals, StatDelta, TourRank, TourSummary,
};

use super::fetch_or;

/// Ranked rows on the dashboard
const TOP_TOURS_LIMIT: i64 = 5;

/// Final length of the merged activity feed
const ACTIVITY_FEED_LIMIT: usize = 10;

/// Events fetched per source before the merge; any single source can
/// fill the feed on its own
const RECENT_FETCH_LIMIT: i64 = 10;

/// How far back the monthly chart reaches
const MONTHLY_WINDOW_DAYS: i64 = 180;

/// Placeholder name when a ranked tour's detail lookup misses
const UNKNOWN_TOUR: &str = "Unknown";

/// Dashboard aggregation service
pub struct AnalyticsService {
    bookings: Arc<dyn BookingRepository>,
    tours: Arc<dyn TourRepository>,
    customers: Arc<dyn CustomerRepository>,
    reviews: Arc<dyn ReviewRepository>,
    inquiries: Arc<dyn InquiryRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
}

impl AnalyticsService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        tours: Arc<dyn TourRepository>,
        customers: Arc<dyn CustomerRepository>,
        reviews: Arc<dyn ReviewRepository>,
        inquiries: Arc<dyn InquiryRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
    ) -> Self {
        Self {
            bookings,
            tours,
            customers,
            reviews,
            inquiries,
            subscribers,
        }
    }

    /// Build the composite dashboard report for the given window.
    ///
    /// The comparison period is the equal-length window immediately
    /// preceding `window`. Every metric is fetched concurrently; the
    /// report is assembled only after all of them have settled.
    pub async fn dashboard_report(
        &self,
        window: ReportWindow,
        memo: &RequestMemo,
    ) -> DashboardReport {
        let previous = window.previous();

        let (
            revenue_current,
            revenue_previous,
            bookings_current,
            bookings_previous,
            customers_current,
            customers_previous,
            top_tours,
            recent_activity,
            monthly,
            totals,
        ) = tokio::join!(
            self.revenue_in(&window, memo),
            self.revenue_in(&previous, memo),
            self.bookings_in(&window, memo),
            self.bookings_in(&previous, memo),
            self.new_customers_in(&window, memo),
            self.new_customers_in(&previous, memo),
            self.top_tours(&window, memo),
            self.recent_activity(memo),
            self.monthly_series(&window, memo),
            self.site_totals(memo),
        );

        DashboardReport {
            window,
            revenue: StatDelta::new(revenue_current, revenue_previous),
            bookings: StatDelta::new(bookings_current as f64, bookings_previous as f64),
            new_customers: StatDelta::new(customers_current as f64, customers_previous as f64),
            top_tours,
            recent_activity,
            monthly,
            totals,
        }
    }

    async fn revenue_in(&self, window: &ReportWindow, memo: &RequestMemo) -> f64 {
        memo.get_or_compute("bookings.revenue", window, || async {
            fetch_or(
                "bookings.revenue",
                0.0,
                self.bookings.revenue_between(window.start, window.end),
            )
            .await
        })
        .await
    }

    async fn bookings_in(&self, window: &ReportWindow, memo: &RequestMemo) -> i64 {
        memo.get_or_compute("bookings.count", window, || async {
            fetch_or(
                "bookings.count",
                0,
                self.bookings.count_between(window.start, window.end),
            )
            .await
        })
        .await
    }

    async fn new_customers_in(&self, window: &ReportWindow, memo: &RequestMemo) -> i64 {
        memo.get_or_compute("customers.new", window, || async {
            fetch_or(
                "customers.new",
                0,
                self.customers.count_between(window.start, window.end),
            )
            .await
        })
        .await
    }

    /// Rank tours by booking revenue over the window, then hydrate each
    /// row with tour details via a second concurrent lookup batch. A
    /// missing tour keeps its counters and gets a placeholder name.
    async fn top_tours(&self, window: &ReportWindow, memo: &RequestMemo) -> Vec<RankedTour> {
        let ranks: Vec<TourRank> = memo
            .get_or_compute("bookings.top_tours", window, || async {
                fetch_or(
                    "bookings.top_tours",
                    Vec::new(),
                    self.bookings
                        .top_tours_between(window.start, window.end, TOP_TOURS_LIMIT),
                )
                .await
            })
            .await;

        let details = futures::future::join_all(
            ranks
                .iter()
                .map(|rank| self.tour_summary(rank.tour_id, memo)),
        )
        .await;

        ranks
            .into_iter()
            .zip(details)
            .map(|(rank, summary)| match summary {
                Some(tour) => RankedTour {
                    tour_id: rank.tour_id,
                    name: tour.name,
                    bookings: rank.bookings,
                    revenue: rank.revenue,
                    price: tour.price,
                    rating: tour.rating,
                },
                None => RankedTour {
                    tour_id: rank.tour_id,
                    name: UNKNOWN_TOUR.to_string(),
                    bookings: rank.bookings,
                    revenue: rank.revenue,
                    price: 0.0,
                    rating: None,
                },
            })
            .collect()
    }

    async fn tour_summary(&self, tour_id: i64, memo: &RequestMemo) -> Option<TourSummary> {
        memo.get_or_compute("tours.summary", &tour_id, || async {
            fetch_or("tours.summary", None, self.tours.find_summary(tour_id)).await
        })
        .await
    }

    /// Fetch the most recent events of each kind independently, map them
    /// into the common shape and merge on the raw timestamp, newest
    /// first. The formatted label is display-only and never the sort key.
    async fn recent_activity(&self, memo: &RequestMemo) -> Vec<ActivityEvent> {
        let (bookings, reviews, inquiries) = tokio::join!(
            memo.get_or_compute("bookings.recent", &RECENT_FETCH_LIMIT, || async {
                fetch_or(
                    "bookings.recent",
                    Vec::new(),
                    self.bookings.recent(RECENT_FETCH_LIMIT),
                )
                .await
            }),
            memo.get_or_compute("reviews.recent", &RECENT_FETCH_LIMIT, || async {
                fetch_or(
                    "reviews.recent",
                    Vec::new(),
                    self.reviews.recent(RECENT_FETCH_LIMIT),
                )
                .await
            }),
            memo.get_or_compute("inquiries.recent", &RECENT_FETCH_LIMIT, || async {
                fetch_or(
                    "inquiries.recent",
                    Vec::new(),
                    self.inquiries.recent(RECENT_FETCH_LIMIT),
                )
                .await
            }),
        );

        let mut events: Vec<ActivityEvent> =
            Vec::with_capacity(bookings.len() + reviews.len() + inquiries.len());
        events.extend(bookings.into_iter().map(booking_event));
        events.extend(reviews.into_iter().map(review_event));
        events.extend(inquiries.into_iter().map(inquiry_event));

        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        events.truncate(ACTIVITY_FEED_LIMIT);
        events
    }

    async fn monthly_series(&self, window: &ReportWindow, memo: &RequestMemo) -> Vec<MonthlyPoint> {
        let since = window.end - chrono::Duration::days(MONTHLY_WINDOW_DAYS);
        memo.get_or_compute("bookings.monthly", &since, || async {
            fetch_or(
                "bookings.monthly",
                Vec::new(),
                self.bookings.monthly_series(since),
            )
            .await
        })
        .await
    }

    async fn site_totals(&self, memo: &RequestMemo) -> SiteTotals {
        let (customers, tours, inquiries, subscribers) = tokio::join!(
            memo.get_or_compute("customers.total", &(), || async {
                fetch_or("customers.total", 0, self.customers.count()).await
            }),
            memo.get_or_compute("tours.total", &(), || async {
                fetch_or("tours.total", 0, self.tours.count()).await
            }),
            memo.get_or_compute("inquiries.total", &(), || async {
                fetch_or("inquiries.total", 0, self.inquiries.count()).await
            }),
            memo.get_or_compute("subscribers.total", &(), || async {
                fetch_or("subscribers.total", 0, self.subscribers.count()).await
            }),
        );

        SiteTotals {
            customers,
            tours,
            inquiries,
            subscribers,
        }
    }
}

fn booking_event(booking: RecentBooking) -> ActivityEvent {
    let title = match &booking.tour_name {
        Some(name) => format!("New booking: {}", name),
        None => "New booking".to_string(),
    };
    ActivityEvent::new(
        ActivityKind::Booking,
        title,
        booking.reference,
        booking.created_at,
        Some(booking.amount),
    )
}

fn review_event(review: RecentReview) -> ActivityEvent {
    let title = match &review.tour_name {
        Some(name) => format!("{}-star review: {}", review.rating, name),
        None => format!("{}-star review", review.rating),
    };
    ActivityEvent::new(
        ActivityKind::Review,
        title,
        review.reviewer_name,
        review.created_at,
        None,
    )
}

fn inquiry_event(inquiry: Inquiry) -> ActivityEvent {
    ActivityEvent::new(
        ActivityKind::Inquiry,
        format!("Inquiry: {}", inquiry.subject),
        inquiry.email,
        inquiry.created_at,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_db;
    use crate::db::repositories::{
        SqlxBookingRepository, SqlxCustomerRepository, SqlxInquiryRepository,
        SqlxReviewRepository, SqlxSubscriberRepository, SqlxTourRepository,
    };
    use crate::db::test_support::{
        days_ago, seed_booking, seed_customer, seed_inquiry, seed_review, seed_subscriber,
        seed_tour, setup_db,
    };
    use crate::db::SharedDb;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    fn service_over(db: SharedDb) -> AnalyticsService {
        AnalyticsService::new(
            SqlxBookingRepository::boxed(db.clone()),
            SqlxTourRepository::boxed(db.clone()),
            SqlxCustomerRepository::boxed(db.clone()),
            SqlxReviewRepository::boxed(db.clone()),
            SqlxInquiryRepository::boxed(db.clone()),
            SqlxSubscriberRepository::boxed(db),
        )
    }

    #[tokio::test]
    async fn test_report_composes_all_sections() {
        let db = setup_db().await;
        let trek = seed_tour(&db, "gorilla-trek", "Gorilla Trek", 300.0, Some(4.8)).await;
        let lake = seed_tour(&db, "lake-kivu", "Lake Kivu Cruise", 80.0, None).await;

        // Current window: 900 revenue; previous window: 600
        seed_booking(&db, trek, "BK-1", "confirmed", 300.0, days_ago(2)).await;
        seed_booking(&db, trek, "BK-2", "completed", 300.0, days_ago(3)).await;
        seed_booking(&db, lake, "BK-3", "confirmed", 300.0, days_ago(4)).await;
        seed_booking(&db, trek, "BK-4", "confirmed", 600.0, days_ago(40)).await;

        seed_customer(&db, "Amina", days_ago(1)).await;
        seed_customer(&db, "Brian", days_ago(45)).await;
        seed_review(&db, trek, "Chantal", 5, days_ago(1)).await;
        seed_inquiry(&db, "Didier", "Gorilla permits", days_ago(2)).await;
        seed_subscriber(&db, "amina@example.com").await;

        let service = service_over(db);
        let memo = RequestMemo::new();
        let report = service
            .dashboard_report(ReportWindow::trailing_days(30), &memo)
            .await;

        assert_eq!(report.revenue.current, 900.0);
        assert_eq!(report.revenue.previous, 600.0);
        assert_eq!(report.revenue.delta_label, "+50.0%");

        assert_eq!(report.bookings.current, 3.0);
        assert_eq!(report.new_customers.current, 1.0);
        assert_eq!(report.new_customers.previous, 1.0);
        assert_eq!(report.new_customers.delta_label, "+0.0%");

        // Trek outsold the lake cruise
        assert_eq!(report.top_tours.len(), 2);
        assert_eq!(report.top_tours[0].name, "Gorilla Trek");
        assert_eq!(report.top_tours[0].bookings, 2);
        assert_eq!(report.top_tours[0].revenue, 600.0);
        assert_eq!(report.top_tours[0].rating, Some(4.8));
        assert!(report.top_tours[0].revenue >= report.top_tours[1].revenue);

        // Bookings, the review and the inquiry all land in the feed
        assert_eq!(report.recent_activity.len(), 6);
        for pair in report.recent_activity.windows(2) {
            assert!(pair[0].occurred_at >= pair[1].occurred_at);
        }

        assert!(!report.monthly.is_empty());
        assert_eq!(
            report.totals,
            SiteTotals {
                customers: 2,
                tours: 2,
                inquiries: 1,
                subscribers: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_feed_is_truncated_and_ordered() {
        let db = setup_db().await;
        let tour = seed_tour(&db, "gorilla-trek", "Gorilla Trek", 300.0, None).await;

        for n in 0..6 {
            seed_booking(
                &db,
                tour,
                &format!("BK-{}", n),
                "confirmed",
                100.0,
                days_ago(n),
            )
            .await;
            seed_review(&db, tour, &format!("Reviewer {}", n), 5, days_ago(n + 1)).await;
            seed_inquiry(&db, &format!("Visitor {}", n), "Dates?", days_ago(n + 2)).await;
        }

        let service = service_over(db);
        let memo = RequestMemo::new();
        let feed = service.recent_activity(&memo).await;

        assert_eq!(feed.len(), 10);
        for pair in feed.windows(2) {
            assert!(pair[0].occurred_at >= pair[1].occurred_at);
        }
        // Booking events carry amounts, the rest do not
        for event in &feed {
            match event.kind {
                ActivityKind::Booking => assert!(event.amount.is_some()),
                _ => assert!(event.amount.is_none()),
            }
        }
    }

    #[tokio::test]
    async fn test_unmigrated_store_yields_all_zero_report() {
        let db = create_test_db().await.unwrap();
        let service = service_over(db);
        let memo = RequestMemo::new();

        let report = service
            .dashboard_report(ReportWindow::trailing_days(30), &memo)
            .await;

        assert_eq!(report.revenue.current, 0.0);
        assert_eq!(report.revenue.delta_pct, 0.0);
        assert_eq!(report.bookings.current, 0.0);
        assert!(report.top_tours.is_empty());
        assert!(report.recent_activity.is_empty());
        assert!(report.monthly.is_empty());
        assert_eq!(report.totals, SiteTotals::default());
    }

    /// Booking repository whose every query fails, for isolation tests
    struct FailingBookings;

    #[async_trait]
    impl BookingRepository for FailingBookings {
        async fn revenue_between(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<f64> {
            anyhow::bail!("connection reset")
        }
        async fn count_between(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<i64> {
            anyhow::bail!("connection reset")
        }
        async fn top_tours_between(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
            _: i64,
        ) -> Result<Vec<TourRank>> {
            anyhow::bail!("connection reset")
        }
        async fn recent(&self, _: i64) -> Result<Vec<RecentBooking>> {
            anyhow::bail!("connection reset")
        }
        async fn monthly_series(&self, _: DateTime<Utc>) -> Result<Vec<MonthlyPoint>> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_blank_the_report() {
        let db = setup_db().await;
        seed_tour(&db, "gorilla-trek", "Gorilla Trek", 300.0, None).await;
        seed_customer(&db, "Amina", days_ago(1)).await;
        seed_inquiry(&db, "Brian", "Permits", days_ago(1)).await;

        let service = AnalyticsService::new(
            Arc::new(FailingBookings),
            SqlxTourRepository::boxed(db.clone()),
            SqlxCustomerRepository::boxed(db.clone()),
            SqlxReviewRepository::boxed(db.clone()),
            SqlxInquiryRepository::boxed(db.clone()),
            SqlxSubscriberRepository::boxed(db),
        );
        let memo = RequestMemo::new();
        let report = service
            .dashboard_report(ReportWindow::trailing_days(30), &memo)
            .await;

        // Booking-backed sections fall back to zero
        assert_eq!(report.revenue.current, 0.0);
        assert!(report.top_tours.is_empty());
        // The siblings are unaffected
        assert_eq!(report.new_customers.current, 1.0);
        assert_eq!(report.totals.tours, 1);
        assert_eq!(report.totals.inquiries, 1);
        // The inquiry still reaches the feed
        assert_eq!(report.recent_activity.len(), 1);
        assert_eq!(report.recent_activity[0].kind, ActivityKind::Inquiry);
    }

    /// Stub rank source paired with an empty tour table, for hydration
    /// miss behavior
    struct StubRanks;

    #[async_trait]
    impl BookingRepository for StubRanks {
        async fn revenue_between(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<f64> {
            Ok(0.0)
        }
        async fn count_between(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<i64> {
            Ok(0)
        }
        async fn top_tours_between(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
            _: i64,
        ) -> Result<Vec<TourRank>> {
            Ok(vec![
                TourRank {
                    tour_id: 901,
                    bookings: 3,
                    revenue: 900.0,
                },
                TourRank {
                    tour_id: 902,
                    bookings: 1,
                    revenue: 80.0,
                },
            ])
        }
        async fn recent(&self, _: i64) -> Result<Vec<RecentBooking>> {
            Ok(Vec::new())
        }
        async fn monthly_series(&self, _: DateTime<Utc>) -> Result<Vec<MonthlyPoint>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_hydration_miss_substitutes_placeholder() {
        let db = setup_db().await;
        let service = AnalyticsService::new(
            Arc::new(StubRanks),
            SqlxTourRepository::boxed(db.clone()),
            SqlxCustomerRepository::boxed(db.clone()),
            SqlxReviewRepository::boxed(db.clone()),
            SqlxInquiryRepository::boxed(db.clone()),
            SqlxSubscriberRepository::boxed(db),
        );
        let memo = RequestMemo::new();
        let window = ReportWindow::trailing_days(30);

        let ranked = service.top_tours(&window, &memo).await;

        assert_eq!(ranked.len(), 2);
        // Counters survive the miss; the name falls back
        assert_eq!(ranked[0].name, "Unknown");
        assert_eq!(ranked[0].bookings, 3);
        assert_eq!(ranked[0].revenue, 900.0);
        assert_eq!(ranked[0].price, 0.0);
        assert!(ranked[0].revenue >= ranked[1].revenue);
    }
}
