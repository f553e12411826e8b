//! Booking projections used by the analytics layer
//!
//! Bookings are written by the reservation flow (outside this crate); the
//! read model only ever aggregates them, so full row entities are not
//! carried here - just the projections the dashboard consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the bookings-per-tour group-by: a foreign key plus its
/// count and summed revenue, awaiting hydration with tour details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourRank {
    pub tour_id: i64,
    pub bookings: i64,
    pub revenue: f64,
}

/// Recent booking as shown in the activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentBooking {
    pub reference: String,
    pub tour_name: Option<String>,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-month revenue and booking counts for the dashboard chart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// Month key in `YYYY-MM` form
    pub month: String,
    pub revenue: f64,
    pub bookings: i64,
}
