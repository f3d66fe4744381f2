use axum::http::{header, HeaderMap};

use crate::errors::AppError;
use crate::models::Role;
use crate::services::auth::{AuthService, Claims};

/// Minimum role an endpoint demands. Master-gated routes deny admin tokens
/// even when otherwise valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    Admin,
    Master,
}

/// Pulls the bearer token from the Authorization header, falling back to the
/// `token` cookie. Header wins when both are present.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    if from_header.is_some() {
        return from_header;
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("token="))
                .map(str::to_string)
        })
}

/// The authorization decision: Permit (claims) or Deny (Unauthorized). Pure
/// predicate over the request headers and the identity service; no business
/// logic lives here.
pub fn authorize(
    headers: &HeaderMap,
    auth: &AuthService,
    required: RequiredRole,
) -> Result<Claims, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let claims = auth.verify_token(&token)?;

    if required == RequiredRole::Master && claims.role != Role::Master {
        return Err(AppError::Unauthorized);
    }

    Ok(claims)
}
