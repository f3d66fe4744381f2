use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::InquiryStatus;
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::{self, InquiryInput};
use crate::state::AppState;

// POST /inquiries (public intake)
pub async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    Json(input): Json<InquiryInput>,
) -> Result<impl IntoResponse, AppError> {
    let new = validation::validate_inquiry(&input).map_err(AppError::Validation)?;

    let inquiry = {
        let db = state.db.lock().unwrap();
        queries::create_inquiry(&db, &new)?
    };

    tracing::info!(id = inquiry.id, "inquiry created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Inquiry submitted",
            "data": inquiry,
        })),
    ))
}

// GET /inquiries (admin)
pub async fn list_inquiries(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let inquiries = {
        let db = state.db.lock().unwrap();
        queries::list_inquiries(&db)?
    };

    Ok(Json(serde_json::json!({ "success": true, "data": inquiries })))
}

#[derive(Deserialize)]
pub struct InquiryStatusInput {
    pub status: Option<String>,
}

// PATCH /inquiries/:id (admin). Unrecognized status falls open to "new".
pub async fn update_inquiry_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<InquiryStatusInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let status = InquiryStatus::parse(input.status.as_deref().unwrap_or(""));

    let db = state.db.lock().unwrap();
    let updated = queries::update_inquiry_status(&db, id, status)?;
    if !updated {
        return Err(AppError::NotFound("Inquiry".to_string()));
    }

    let inquiry = queries::get_inquiry(&db, id)?
        .ok_or_else(|| AppError::NotFound("Inquiry".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Inquiry updated",
        "data": inquiry,
    })))
}
