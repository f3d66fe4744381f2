use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::{self, FeedbackInput};
use crate::state::AppState;

// POST /feedback (public; anonymous reviews allowed)
pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(input): Json<FeedbackInput>,
) -> Result<impl IntoResponse, AppError> {
    let new = validation::validate_feedback(&input).map_err(AppError::Validation)?;

    let feedback = {
        let db = state.db.lock().unwrap();
        queries::create_feedback(&db, &new)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Feedback submitted",
            "data": feedback,
        })),
    ))
}

// GET /feedback (admin)
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let entries = {
        let db = state.db.lock().unwrap();
        queries::list_feedback(&db)?
    };

    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}

// DELETE /feedback/:id (admin)
pub async fn delete_feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_feedback(&db, id)?
    };

    if !deleted {
        return Err(AppError::NotFound("Feedback".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Feedback deleted",
    })))
}
