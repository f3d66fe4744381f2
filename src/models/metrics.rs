use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One sample in the append-only per-metric time series. Retention is
/// unbounded; there is no downsampling or eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub recorded_at: NaiveDateTime,
}
