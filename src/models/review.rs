//! Review projections used by the analytics layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recent review as shown in the activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentReview {
    pub reviewer_name: String,
    pub rating: i64,
    pub tour_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
