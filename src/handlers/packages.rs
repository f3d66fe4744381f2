use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::{self, PackageInput};
use crate::state::AppState;

// POST /packages (admin)
pub async fn create_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<PackageInput>,
) -> Result<impl IntoResponse, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let new = validation::validate_package(&input).map_err(AppError::Validation)?;

    let package = {
        let db = state.db.lock().unwrap();
        queries::create_package(&db, &new)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Package created",
            "data": package,
        })),
    ))
}

// GET /packages (public). Only active packages are shown, and a store error
// degrades to an empty list so the public page keeps rendering.
pub async fn list_packages(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let packages = {
        let db = state.db.lock().unwrap();
        match queries::list_packages(&db, true) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "package listing failed, serving empty");
                vec![]
            }
        }
    };

    Json(serde_json::json!({ "success": true, "data": packages }))
}

// PATCH /packages/:id (admin)
pub async fn update_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<PackageInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let db = state.db.lock().unwrap();
    let existing = queries::get_package(&db, id)?
        .ok_or_else(|| AppError::NotFound("Package".to_string()))?;

    let updated =
        validation::apply_package_update(&existing, &input).map_err(AppError::Validation)?;

    queries::update_package(&db, &updated)?;

    // Re-read so the response carries the store's updated_at, not the
    // pre-update value.
    let package = queries::get_package(&db, id)?
        .ok_or_else(|| AppError::NotFound("Package".to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Package updated",
        "data": package,
    })))
}

// DELETE /packages/:id (admin)
pub async fn delete_package(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_package(&db, id)?
    };

    if !deleted {
        return Err(AppError::NotFound("Package".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Package deleted",
    })))
}
