use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::{AppError, FieldError};
use crate::models::Role;
use crate::services::gate::{self, RequiredRole};
use crate::services::validation::is_valid_email;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMasterInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

fn validate_credentials(
    username: &str,
    password: &str,
    email: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = vec![];
    if username.chars().count() < 3 {
        errors.push(FieldError::new(
            "username",
            "Username must be at least 3 characters",
        ));
    }
    if password.chars().count() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// POST /admin/create-master (one-time bootstrap, unauthenticated)
pub async fn create_master(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateMasterInput>,
) -> Result<Response, AppError> {
    let username = input.username.as_deref().unwrap_or("").trim().to_string();
    let password = input.password.as_deref().unwrap_or("").to_string();
    let email = input.email.as_deref().unwrap_or("").trim().to_string();
    let full_name = input.full_name.as_deref().unwrap_or("").trim().to_string();

    validate_credentials(&username, &password, &email).map_err(AppError::Validation)?;

    let db = state.db.lock().unwrap();

    // Bootstrap only: once any admin exists this endpoint is closed.
    if queries::count_admins(&db)? > 0 {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "message": "Master admin already exists",
            })),
        )
            .into_response());
    }

    let admin = state
        .auth
        .create_admin(&db, &username, &password, &email, &full_name, Role::Master)?;

    tracing::info!(username = %admin.username, "master admin created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Master admin created",
            "data": admin,
        })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: Option<String>,
    pub password: Option<String>,
}

// POST /master-auth (credential exchange)
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let username = input.username.as_deref().unwrap_or("").trim();
    let password = input.password.as_deref().unwrap_or("");

    let (token, claims) = {
        let db = state.db.lock().unwrap();
        state.auth.authenticate(&db, username, password)?
    };

    tracing::info!(username = %claims.username, "admin logged in");

    Ok(Json(serde_json::json!({
        "success": true,
        "token": token,
        "expiresAt": claims.exp,
        "admin": {
            "username": claims.username,
            "role": claims.role,
        },
    })))
}

// GET /admin/verify
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "admin": claims,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// PATCH /admin/profile (self-service). A password change rotates the hash to
// the current Argon2id scheme even for legacy accounts.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = gate::authorize(&headers, &state.auth, RequiredRole::Admin)?;

    let db = state.db.lock().unwrap();
    let mut admin = queries::get_admin_by_id(&db, &claims.sub)?
        .ok_or_else(|| AppError::NotFound("Admin".to_string()))?;

    let mut errors = vec![];

    if let Some(name) = input.full_name {
        admin.full_name = name.trim().to_string();
    }
    if let Some(email) = input.email {
        let email = email.trim().to_string();
        if is_valid_email(&email) {
            admin.email = email;
        } else {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
    }
    if let Some(password) = input.password {
        if password.chars().count() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        } else {
            admin.password_hash = state.auth.hash_password(&password)?;
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    queries::update_admin_profile(&db, &admin)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Profile updated",
        "data": admin,
    })))
}

// GET /admin/users (master only)
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::authorize(&headers, &state.auth, RequiredRole::Master)?;

    let admins = {
        let db = state.db.lock().unwrap();
        queries::list_admins(&db)?
    };

    Ok(Json(serde_json::json!({ "success": true, "data": admins })))
}
