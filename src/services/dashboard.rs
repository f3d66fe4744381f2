use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::MetricSample;

pub const DEFAULT_SERIES_LIMIT: i64 = 100;
const RECENT_BOOKINGS: i64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: i64,
    pub total_inquiries: i64,
    pub total_feedback: i64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBooking {
    pub id: i64,
    pub name: String,
    pub service: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub stats: DashboardStats,
    pub recent_bookings: Vec<RecentBooking>,
}

impl Snapshot {
    fn zero() -> Self {
        Self {
            stats: DashboardStats {
                total_bookings: 0,
                total_inquiries: 0,
                total_feedback: 0,
                average_rating: 0.0,
            },
            recent_bookings: vec![],
        }
    }
}

/// Snapshot mode. A store failure degrades to the zero-state snapshot (and
/// is logged for operators) instead of breaking the dashboard with a 5xx.
pub fn snapshot(conn: &Connection) -> Snapshot {
    match try_snapshot(conn) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "dashboard snapshot failed, serving zero-state");
            Snapshot::zero()
        }
    }
}

fn try_snapshot(conn: &Connection) -> Result<Snapshot, AppError> {
    let stats = DashboardStats {
        total_bookings: queries::count_bookings(conn)?,
        total_inquiries: queries::count_inquiries(conn)?,
        total_feedback: queries::count_feedback(conn)?,
        average_rating: queries::average_rating(conn)?,
    };

    let recent_bookings = queries::recent_bookings(conn, RECENT_BOOKINGS)?
        .into_iter()
        .map(|b| RecentBooking {
            id: b.id,
            name: b.name,
            service: b.service,
            created_at: b.created_at,
        })
        .collect();

    Ok(Snapshot {
        stats,
        recent_bookings,
    })
}

/// Time-series read mode: most recent `limit` samples in insertion order.
/// Degrades to an empty series on store failure, same policy as the snapshot.
pub fn metric_series(conn: &Connection, name: &str, limit: i64) -> Vec<MetricSample> {
    match queries::recent_metric_samples(conn, name, limit) {
        Ok(samples) => samples,
        Err(e) => {
            tracing::error!(error = %e, metric = name, "metric series read failed, serving empty");
            vec![]
        }
    }
}

/// Append path. Writes do NOT degrade; the caller gets the error and retries.
pub fn record_metric(
    conn: &Connection,
    name: &str,
    value: f64,
) -> Result<MetricSample, AppError> {
    queries::append_metric(conn, name, value)
}
