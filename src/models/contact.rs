//! Inquiry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contact-form inquiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}
