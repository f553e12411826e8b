//! Dashboard report model
//!
//! Value objects composing the admin dashboard: headline stats with
//! period-over-period deltas, ranked top tours, the merged activity feed
//! and site-wide totals. All of it is computed per call; nothing here is
//! persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::activity::ActivityEvent;
use super::booking::MonthlyPoint;

/// Reporting window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The window covering the `days` days up to now
    pub fn trailing_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days.max(1)),
            end,
        }
    }

    /// The equal-length window immediately preceding this one
    pub fn previous(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self.start - length,
            end: self.start,
        }
    }
}

/// Percentage change between a current and a prior comparable period.
///
/// Both periods empty reads as no change; growth from nothing reads as
/// a flat +100%.
pub fn percent_delta(current: f64, previous: f64) -> f64 {
    if current == 0.0 && previous == 0.0 {
        0.0
    } else if previous == 0.0 {
        100.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// A headline metric for the current window, with its prior-window value
/// and percentage delta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatDelta {
    pub current: f64,
    pub previous: f64,
    pub delta_pct: f64,
    /// Signed, one-decimal rendering of `delta_pct`, e.g. "+12.5%"
    pub delta_label: String,
}

impl StatDelta {
    pub fn new(current: f64, previous: f64) -> Self {
        let delta_pct = percent_delta(current, previous);
        Self {
            current,
            previous,
            delta_pct,
            delta_label: format!("{:+.1}%", delta_pct),
        }
    }
}

/// A ranked top-tour row: the group-by counters plus hydrated tour details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankedTour {
    pub tour_id: i64,
    /// Tour name; "Unknown" when the detail lookup missed
    pub name: String,
    pub bookings: i64,
    pub revenue: f64,
    pub price: f64,
    pub rating: Option<f64>,
}

/// Site-wide descriptive totals shown under the headline stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTotals {
    pub customers: i64,
    pub tours: i64,
    pub inquiries: i64,
    pub subscribers: i64,
}

/// The composite dashboard report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub window: ReportWindow,
    pub revenue: StatDelta,
    pub bookings: StatDelta,
    pub new_customers: StatDelta,
    pub top_tours: Vec<RankedTour>,
    pub recent_activity: Vec<ActivityEvent>,
    pub monthly: Vec<MonthlyPoint>,
    pub totals: SiteTotals,
}

/// One `Metric,Value` row of the CSV export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub title: String,
    pub value: String,
}

impl StatLine {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_delta_cases() {
        assert_eq!(percent_delta(0.0, 0.0), 0.0);
        assert_eq!(percent_delta(5.0, 0.0), 100.0);
        assert_eq!(percent_delta(50.0, 100.0), -50.0);
        assert_eq!(percent_delta(150.0, 100.0), 50.0);
    }

    #[test]
    fn test_delta_label_rendering() {
        assert_eq!(StatDelta::new(150.0, 100.0).delta_label, "+50.0%");
        assert_eq!(StatDelta::new(50.0, 100.0).delta_label, "-50.0%");
        assert_eq!(StatDelta::new(0.0, 0.0).delta_label, "+0.0%");
        assert_eq!(StatDelta::new(100.0, 300.0).delta_label, "-66.7%");
    }

    #[test]
    fn test_previous_window_is_adjacent_and_equal_length() {
        let window = ReportWindow::trailing_days(30);
        let previous = window.previous();
        assert_eq!(previous.end, window.start);
        assert_eq!(previous.end - previous.start, window.end - window.start);
    }

    proptest! {
        /// Growth is positive exactly when current exceeds previous, for
        /// any non-degenerate previous period.
        #[test]
        fn property_delta_sign(current in 0.0f64..1e9, previous in 0.001f64..1e9) {
            let delta = percent_delta(current, previous);
            if current > previous {
                prop_assert!(delta > 0.0);
            } else if current < previous {
                prop_assert!(delta < 0.0);
            } else {
                prop_assert_eq!(delta, 0.0);
            }
        }
    }
}
