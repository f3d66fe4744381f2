use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::{self, BookingInput, BookingUpdateInput};
use crate::state::AppState;

// POST /bookings (public intake)
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(input): Json<BookingInput>,
) -> Result<impl IntoResponse, AppError> {
    let new = validation::validate_booking(&input, state.config.base_price)
        .map_err(AppError::Validation)?;

    let booking = {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &new)?
    };

    tracing::info!(id = booking.id, service = %booking.service, "booking created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Booking created",
            "data": booking,
        })),
    ))
}

// GET /bookings (admin)
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db)?
    };

    Ok(Json(serde_json::json!({ "success": true, "data": bookings })))
}

// PATCH /bookings/:id (admin)
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<BookingUpdateInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let db = state.db.lock().unwrap();
    let existing = queries::get_booking(&db, id)?
        .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;

    let updated =
        validation::apply_booking_update(&existing, &input).map_err(AppError::Validation)?;

    queries::update_booking(&db, &updated)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Booking updated",
        "data": updated,
    })))
}

// DELETE /bookings/:id (admin)
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_booking(&db, id)?
    };

    if !deleted {
        return Err(AppError::NotFound("Booking".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Booking deleted",
    })))
}
