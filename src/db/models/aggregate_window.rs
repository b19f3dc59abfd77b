//! Aggregated summary over a span of raw readings.
//!
//! Rows are produced by the upstream ETL job. Several windows can share the
//! same average temperature, so lookups against live readings go through
//! [`crate::matcher::select_nearest`] rather than an exact key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateWindow {
    pub id: Option<i64>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    /// Categorical label assigned by the ETL ("Nyaman", "Gerah", ...).
    pub condition: String,
    pub risk_level: String,
    pub recommendation: String,
}
