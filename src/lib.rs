pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router. Shared between `main` and the
/// integration tests so both exercise the same route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // public intake
        .route(
            "/bookings",
            post(handlers::bookings::create_booking).get(handlers::bookings::list_bookings),
        )
        .route(
            "/bookings/:id",
            patch(handlers::bookings::update_booking).delete(handlers::bookings::delete_booking),
        )
        .route(
            "/inquiries",
            post(handlers::inquiries::create_inquiry).get(handlers::inquiries::list_inquiries),
        )
        .route(
            "/inquiries/:id",
            patch(handlers::inquiries::update_inquiry_status),
        )
        .route(
            "/feedback",
            post(handlers::feedback::create_feedback).get(handlers::feedback::list_feedback),
        )
        .route("/feedback/:id", delete(handlers::feedback::delete_feedback))
        .route(
            "/packages",
            post(handlers::packages::create_package).get(handlers::packages::list_packages),
        )
        .route(
            "/packages/:id",
            patch(handlers::packages::update_package).delete(handlers::packages::delete_package),
        )
        .route(
            "/offers",
            post(handlers::offers::create_offer).get(handlers::offers::list_offers),
        )
        .route(
            "/offers/:id",
            put(handlers::offers::update_offer).delete(handlers::offers::delete_offer),
        )
        // admin identity
        .route("/admin/create-master", post(handlers::auth::create_master))
        .route("/master-auth", post(handlers::auth::login))
        .route("/admin/verify", get(handlers::auth::verify_token))
        .route("/admin/profile", patch(handlers::auth::update_profile))
        .route("/admin/users", get(handlers::auth::list_admins))
        // dashboard
        .route(
            "/dashboard",
            get(handlers::dashboard::get_dashboard).post(handlers::dashboard::append_metric),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
