use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::errors::{AppError, FieldError};
use crate::services::dashboard::{self, DEFAULT_SERIES_LIMIT};
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::{parse_f64, NumInput};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub metric: Option<String>,
    pub limit: Option<i64>,
}

// GET /dashboard (admin). Snapshot by default; time-series when ?metric= is
// present. Both read modes degrade instead of failing.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let db = state.db.lock().unwrap();

    if let Some(metric) = query.metric.as_deref() {
        let limit = query.limit.unwrap_or(DEFAULT_SERIES_LIMIT).clamp(1, 10_000);
        let samples = dashboard::metric_series(&db, metric, limit);
        return Ok(Json(serde_json::json!({
            "success": true,
            "metric": metric,
            "data": samples,
        })));
    }

    let snap = dashboard::snapshot(&db);
    Ok(Json(serde_json::json!({
        "success": true,
        "stats": snap.stats,
        "recentBookings": snap.recent_bookings,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricInput {
    pub metric_name: Option<String>,
    pub metric_value: Option<NumInput>,
}

// POST /dashboard (admin): append one sample. Write errors are surfaced, not
// absorbed.
pub async fn append_metric(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<MetricInput>,
) -> Result<impl IntoResponse, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let mut errors = vec![];

    let name = input
        .metric_name
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    if name.is_empty() {
        errors.push(FieldError::new("metricName", "Metric name is required"));
    }

    let value = match input.metric_value.as_ref().and_then(parse_f64) {
        Some(v) => v,
        None => {
            errors.push(FieldError::new("metricValue", "Invalid metric value"));
            0.0
        }
    };

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let sample = {
        let db = state.db.lock().unwrap();
        dashboard::record_metric(&db, &name, value)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Metric recorded",
            "data": sample,
        })),
    ))
}
