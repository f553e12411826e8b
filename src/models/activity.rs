//! Activity feed model
//!
//! Recent bookings, reviews and inquiries are fetched independently and
//! merged into one reverse-chronological feed. The union is explicit - a
//! discriminant plus the common fields - rather than a cross-table SQL
//! union, so each source keeps its own typed query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminant for the merged activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Booking,
    Review,
    Inquiry,
}

/// One entry of the merged recent-activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    /// Human-readable headline
    pub title: String,
    /// Source-specific reference (booking reference, reviewer, sender)
    pub reference: String,
    /// Raw event timestamp - the feed sort key
    pub occurred_at: DateTime<Utc>,
    /// Locale-short display form of `occurred_at`; never used for ordering
    pub occurred_label: String,
    /// Monetary amount, present only for booking events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl ActivityEvent {
    pub fn new(
        kind: ActivityKind,
        title: String,
        reference: String,
        occurred_at: DateTime<Utc>,
        amount: Option<f64>,
    ) -> Self {
        Self {
            kind,
            title,
            reference,
            occurred_label: format_short(occurred_at),
            occurred_at,
            amount,
        }
    }
}

/// Format a timestamp as `"{month} {day}, {hour}:{minute}"`, e.g. "Aug 6, 14:05"
fn format_short(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %H:%M").to_string()
}
