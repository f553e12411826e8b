//! Tour reference data

use serde::{Deserialize, Serialize};

/// Descriptive tour fields used to hydrate ranked dashboard rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub rating: Option<f64>,
}
