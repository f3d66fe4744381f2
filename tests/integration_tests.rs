use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use bookwell::config::AppConfig;
use bookwell::db::{self, queries};
use bookwell::models::{AdminUser, Role};
use bookwell::services::auth::{legacy_sha256_hex, AuthService, Claims};
use bookwell::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        token_secret: "test-secret".to_string(),
        base_price: 999.0,
    }
}

fn test_state() -> Arc<AppState> {
    let config = test_config();
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        auth: AuthService::new(config.token_secret),
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    bookwell::build_router(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates the master admin through the bootstrap endpoint and logs in,
/// returning the bearer token.
async fn bootstrap_master(app: &Router) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/create-master",
            serde_json::json!({
                "username": "master",
                "password": "sup3rsecret",
                "email": "master@example.com",
                "fullName": "Master Admin",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "master", "password": "sup3rsecret" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let json = body_json(res).await;
    json["token"].as_str().unwrap().to_string()
}

fn booking_body(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "Asha Rao",
        "contact": "9876543210",
        "email": "asha@example.com",
        "service": "Deep Tissue Massage",
        "date": "2025-07-01",
        "time": "14:00",
    })
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let res = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[test]
fn test_schema_init_is_idempotent() {
    // Two services pointed at the same file must both be able to run
    // initialization.
    let conn = db::init_db(":memory:").unwrap();
    db::migrations::run_migrations(&conn).unwrap();

    conn.execute(
        "INSERT INTO inquiries (name, phone, message) VALUES ('A', '9876543210', 'hello there')",
        [],
    )
    .unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM inquiries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

// ── Inquiries ──

#[tokio::test]
async fn test_inquiry_invalid_phone_and_message() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));

    // name "Jo" is exactly 2 chars (valid); phone is 8 digits and message is
    // 5 chars, so exactly two field errors come back.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inquiries",
            serde_json::json!({ "name": "Jo", "phone": "98765432", "message": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let json = body_json(res).await;
    assert_eq!(json["success"], false);
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert!(fields.contains(&"phone"));
    assert!(fields.contains(&"message"));

    // Rejected input never reaches the store.
    let db = state.db.lock().unwrap();
    assert_eq!(queries::count_inquiries(&db).unwrap(), 0);
}

#[tokio::test]
async fn test_inquiry_create_and_admin_list() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inquiries",
            serde_json::json!({
                "name": "Priya Sharma",
                "phone": "9876543210",
                "email": "priya@example.com",
                "message": "Do you have weekend availability?",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["data"]["status"], "new");

    // Listing requires admin auth.
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/inquiries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/inquiries", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "Priya Sharma");
}

#[tokio::test]
async fn test_inquiry_status_fail_open_and_not_found() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inquiries",
            serde_json::json!({
                "name": "Ravi",
                "phone": "9000000001",
                "message": "Need a home visit next week please",
            }),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["data"]["id"].as_i64().unwrap();

    // Recognized status sticks.
    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/inquiries/{id}"),
            &token,
            serde_json::json!({ "status": "resolved" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["status"], "resolved");

    // Unrecognized status falls open to the default instead of rejecting.
    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/inquiries/{id}"),
            &token,
            serde_json::json!({ "status": "bogus-state" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["status"], "new");

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/inquiries/99999",
            &token,
            serde_json::json!({ "status": "resolved" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Offers ──

#[tokio::test]
async fn test_offer_duplicate_code_conflict() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/offers",
            &token,
            serde_json::json!({
                "title": "Summer Special",
                "discount": "20%",
                "code": "SAVE20",
                "validUntil": "2025-12-31",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Codes are uppercased during sanitization, so "save20" collides.
    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/offers",
            &token,
            serde_json::json!({
                "title": "Another Offer",
                "discount": "10%",
                "code": "save20",
                "validUntil": "2025-12-31",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await["success"], false);
}

#[tokio::test]
async fn test_offer_code_too_short_after_sanitization() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/offers",
            &token,
            serde_json::json!({
                "title": "10% Off",
                "discount": "10%",
                "code": "sa",
                "validUntil": "2025-12-31",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Code must be at least 3 characters");
}

#[tokio::test]
async fn test_offer_title_html_stripped_and_public_list() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/offers",
            &token,
            serde_json::json!({
                "title": "<b>Festive</b> Deal",
                "discount": "15%",
                "code": "fest15",
                "validUntil": "2025-11-01",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["data"]["title"], "Festive Deal");
    assert_eq!(json["data"]["code"], "FEST15");

    // The offer list is public, no token needed.
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["status"], "Active");
}

#[tokio::test]
async fn test_offer_update_response_reflects_stored_timestamp() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/offers",
            &token,
            serde_json::json!({
                "title": "Summer Special",
                "discount": "20%",
                "code": "SAVE20",
                "validUntil": "2025-12-31",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = body_json(res).await["data"]["id"].as_i64().unwrap();

    // Backdate the stored row so a stale response value is detectable.
    {
        let db = state.db.lock().unwrap();
        db.execute("UPDATE offers SET updated_at = '2020-01-01 00:00:00'", [])
            .unwrap();
    }

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/offers/{id}"),
            &token,
            serde_json::json!({
                "title": "Summer Special",
                "discount": "25%",
                "code": "SAVE25",
                "validUntil": "2025-12-31",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let put_json = body_json(res).await;
    let response_updated = put_json["data"]["updatedAt"].as_str().unwrap().to_string();
    assert_ne!(response_updated, "2020-01-01T00:00:00");

    // The response must agree with what a subsequent read returns.
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["data"][0]["updatedAt"].as_str().unwrap(), response_updated);
}

// ── Bookings ──

#[tokio::test]
async fn test_booking_delete_idempotent_failure() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_request("DELETE", "/bookings/42", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/bookings", booking_body(42)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(authed_request("DELETE", "/bookings/42", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A second delete of the same id fails the same way.
    let res = app
        .clone()
        .oneshot(authed_request("DELETE", "/bookings/42", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_caller_supplied_id_conflict() {
    let app = test_app(test_state());

    let res = app
        .clone()
        .oneshot(json_request("POST", "/bookings", booking_body(7)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/bookings", booking_body(7)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_defaults_applied() {
    let app = test_app(test_state());

    let res = app
        .clone()
        .oneshot(json_request("POST", "/bookings", booking_body(1)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["data"]["status"], "Pending");
    assert_eq!(json["data"]["payment"], "Pending");
    assert_eq!(json["data"]["amount"], 999.0);
}

#[tokio::test]
async fn test_booking_amount_rejects_non_finite() {
    let app = test_app(test_state());

    // "inf" parses as f64 but is meaningless as a price.
    let mut body = booking_body(1);
    body["amount"] = serde_json::json!("inf");
    let res = app
        .clone()
        .oneshot(json_request("POST", "/bookings", body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["amount"]);
}

#[tokio::test]
async fn test_booking_status_state_machine() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    app.clone()
        .oneshot(json_request("POST", "/bookings", booking_body(5)))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/bookings/5",
            &token,
            serde_json::json!({ "status": "Confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["status"], "Confirmed");

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/bookings/5",
            &token,
            serde_json::json!({ "status": "Completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Completed is terminal.
    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/bookings/5",
            &token,
            serde_json::json!({ "status": "Cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_payment_no_reverse_transition() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    app.clone()
        .oneshot(json_request("POST", "/bookings", booking_body(9)))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/bookings/9",
            &token,
            serde_json::json!({ "payment": "Paid" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/bookings/9",
            &token,
            serde_json::json!({ "payment": "Cash" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Packages ──

#[tokio::test]
async fn test_package_features_round_trip_order() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/packages",
            &token,
            serde_json::json!({
                "title": "Relax Pack",
                "originalPrice": 5000,
                "discountedPrice": 4000,
                "discountPercentage": 20,
                "sessions": 5,
                "validityDays": 90,
                "features": ["A", "B"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/packages").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"][0]["features"], serde_json::json!(["A", "B"]));
    assert_eq!(json["data"][0]["packageType"], "massage");
}

#[tokio::test]
async fn test_package_price_invariant() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/packages",
            &token,
            serde_json::json!({
                "title": "Bad Pack",
                "originalPrice": 1000,
                "discountedPrice": 2000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Discounted price cannot exceed original price");
}

#[tokio::test]
async fn test_package_numeric_parse_failure_is_error() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    // A non-numeric price must be a validation error, not a silent zero.
    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/packages",
            &token,
            serde_json::json!({
                "title": "Odd Pack",
                "originalPrice": "lots",
                "discountedPrice": 500,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"originalPrice"));
}

#[tokio::test]
async fn test_inactive_packages_hidden_from_public_list() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/packages",
            &token,
            serde_json::json!({
                "title": "Retired Pack",
                "originalPrice": 3000,
                "discountedPrice": 2500,
                "status": "inactive",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/packages").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_package_update_response_reflects_stored_timestamp() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/packages",
            &token,
            serde_json::json!({
                "title": "Relax Pack",
                "originalPrice": 5000,
                "discountedPrice": 4000,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = body_json(res).await["data"]["id"].as_i64().unwrap();

    {
        let db = state.db.lock().unwrap();
        db.execute("UPDATE packages SET updated_at = '2020-01-01 00:00:00'", [])
            .unwrap();
    }

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/packages/{id}"),
            &token,
            serde_json::json!({ "discountedPrice": 3500 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"]["discountedPrice"], 3500);
    assert_ne!(json["data"]["updatedAt"].as_str().unwrap(), "2020-01-01T00:00:00");
}

// ── Feedback ──

#[tokio::test]
async fn test_feedback_anonymous_and_delete() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    // Anonymous feedback with no booking link is valid.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/feedback",
            serde_json::json!({ "rating": 5, "comment": "Wonderful session" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = body_json(res).await["data"]["id"].as_i64().unwrap();

    // Multiple feedback entries may reference the same booking.
    for _ in 0..2 {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/feedback",
                serde_json::json!({ "bookingId": 1, "rating": 4, "comment": "Great as always" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app
        .clone()
        .oneshot(authed_request("DELETE", &format!("/feedback/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(authed_request("DELETE", &format!("/feedback/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feedback_rating_out_of_range() {
    let app = test_app(test_state());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/feedback",
            serde_json::json!({ "rating": 9, "comment": "Off the chart" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Rating must be between 1 and 5");
}

// ── Admin identity ──

#[tokio::test]
async fn test_master_bootstrap_only_once() {
    let app = test_app(test_state());
    let _token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/create-master",
            serde_json::json!({
                "username": "another",
                "password": "password1",
                "email": "another@example.com",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["message"], "Master admin already exists");
}

#[tokio::test]
async fn test_login_invalid_credentials_indistinguishable() {
    let app = test_app(test_state());
    let _token = bootstrap_master(&app).await;

    // Wrong password for a real user.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "master", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw = body_json(res).await;
    assert_eq!(wrong_pw["success"], false);
    assert_eq!(wrong_pw["message"], "Invalid credentials");

    // Nonexistent username gets the exact same response shape.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "nobody", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await, wrong_pw);
}

#[tokio::test]
async fn test_verify_endpoint_and_cookie_fallback() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/admin/verify", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["admin"]["username"], "master");
    assert_eq!(json["admin"]["role"], "master");

    // Token in a cookie works too.
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header("cookie", format!("theme=dark; token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/admin/verify", "not-a-token"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/admin/verify").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_master_only_route_denies_admin_role() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));
    let master_token = bootstrap_master(&app).await;

    // Create a plain admin account directly through the identity service.
    let admin_token = {
        let db = state.db.lock().unwrap();
        let admin = state
            .auth
            .create_admin(
                &db,
                "staff",
                "staffpass",
                "staff@example.com",
                "Staff Member",
                Role::Admin,
            )
            .unwrap();
        state.auth.issue_token(&admin).unwrap().0
    };

    // The admin token passes an admin-gated route...
    let res = app
        .clone()
        .oneshot(authed_request("GET", "/bookings", &admin_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // ...but is denied on the master-only listing.
    let res = app
        .clone()
        .oneshot(authed_request("GET", "/admin/users", &admin_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/admin/users", &master_token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_profile_update_rotates_password() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            "/admin/profile",
            &token,
            serde_json::json!({ "fullName": "Head Admin", "password": "newsecret" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["data"]["fullName"], "Head Admin");
    // The password hash never leaves the server.
    assert!(json["data"].get("passwordHash").is_none());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "master", "password": "newsecret" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "master", "password": "sup3rsecret" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// ── Token properties ──

#[test]
fn test_token_rejected_with_different_secret() {
    let issuer = AuthService::new("secret-a".to_string());
    let other = AuthService::new("secret-b".to_string());

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "id-1".to_string(),
        username: "master".to_string(),
        role: Role::Master,
        iat: now,
        exp: now + 3600,
    };
    let token = issuer.sign_claims(&claims).unwrap();

    assert!(issuer.verify_token(&token).is_ok());
    assert!(other.verify_token(&token).is_err());
}

#[test]
fn test_token_expired_exactly_at_exp() {
    let auth = AuthService::new("secret".to_string());
    let now = Utc::now().timestamp();

    let live = Claims {
        sub: "id-1".to_string(),
        username: "master".to_string(),
        role: Role::Master,
        iat: now - 10,
        exp: now + 60,
    };
    assert!(auth.verify_token(&auth.sign_claims(&live).unwrap()).is_ok());

    // exp equal to the current second is already expired.
    let expired = Claims { exp: now, ..live.clone() };
    assert!(auth
        .verify_token(&auth.sign_claims(&expired).unwrap())
        .is_err());
}

#[test]
fn test_tampered_token_rejected() {
    let auth = AuthService::new("secret".to_string());
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: "id-1".to_string(),
        username: "staff".to_string(),
        role: Role::Admin,
        iat: now,
        exp: now + 3600,
    };
    let token = auth.sign_claims(&claims).unwrap();

    // Swap the payload for one claiming master role; the signature no longer
    // matches.
    let master_claims = Claims { role: Role::Master, ..claims };
    let forged_payload = auth
        .sign_claims(&master_claims)
        .unwrap()
        .split('.')
        .next()
        .unwrap()
        .to_string();
    let sig = token.split('.').nth(1).unwrap();
    assert!(auth.verify_token(&format!("{forged_payload}.{sig}")).is_err());
}

// ── Legacy hash migration ──

#[tokio::test]
async fn test_legacy_sha256_account_can_still_log_in() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));

    {
        let db = state.db.lock().unwrap();
        let legacy = AdminUser {
            id: "legacy-1".to_string(),
            username: "oldtimer".to_string(),
            password_hash: format!("sha256${}", legacy_sha256_hex("hunter22")),
            email: "old@example.com".to_string(),
            full_name: "Old Timer".to_string(),
            role: Role::Master,
            is_active: true,
            last_login: None,
            created_at: Utc::now().naive_utc(),
        };
        queries::insert_admin(&db, &legacy).unwrap();
    }

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/master-auth",
            serde_json::json!({ "username": "oldtimer", "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // New hashes are Argon2id, never the legacy format.
    let fresh = state.auth.hash_password("hunter22").unwrap();
    assert!(fresh.starts_with("$argon2"));
    assert!(AuthService::verify_password("hunter22", &fresh));
    assert!(!AuthService::verify_password("wrong", &fresh));
}

// ── Dashboard ──

#[tokio::test]
async fn test_dashboard_snapshot_counts_and_recent() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));
    let token = bootstrap_master(&app).await;

    for id in 1..=7 {
        let res = app
            .clone()
            .oneshot(json_request("POST", "/bookings", booking_body(id)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    app.clone()
        .oneshot(json_request(
            "POST",
            "/feedback",
            serde_json::json!({ "rating": 4, "comment": "Really lovely visit" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/feedback",
            serde_json::json!({ "rating": 2, "comment": "Arrived late sadly" }),
        ))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/dashboard", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["stats"]["totalBookings"], 7);
    assert_eq!(json["stats"]["totalFeedback"], 2);
    assert_eq!(json["stats"]["averageRating"], 3.0);

    // Five most recent, newest first.
    let recent = json["recentBookings"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["id"], 7);
}

#[tokio::test]
async fn test_dashboard_zero_state_when_store_down() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));
    let token = bootstrap_master(&app).await;

    // Simulate a broken store by dropping the tables out from under the
    // aggregator.
    {
        let db = state.db.lock().unwrap();
        db.execute_batch("DROP TABLE bookings; DROP TABLE inquiries; DROP TABLE feedback;")
            .unwrap();
    }

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/dashboard", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["stats"]["totalBookings"], 0);
    assert_eq!(json["stats"]["totalInquiries"], 0);
    assert_eq!(json["stats"]["totalFeedback"], 0);
    assert_eq!(json["stats"]["averageRating"], 0.0);
    assert_eq!(json["recentBookings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_public_offer_list_degrades_on_store_error() {
    let state = test_state();
    let app = test_app(Arc::clone(&state));

    {
        let db = state.db.lock().unwrap();
        db.execute_batch("DROP TABLE offers;").unwrap();
    }

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_metric_series_insertion_order_and_limit() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    for v in [10.0, 20.0, 30.0, 40.0] {
        let res = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/dashboard",
                &token,
                serde_json::json!({ "metricName": "visits", "metricValue": v }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    // A second metric must not leak into the series.
    app.clone()
        .oneshot(authed_json_request(
            "POST",
            "/dashboard",
            &token,
            serde_json::json!({ "metricName": "revenue", "metricValue": 5000 }),
        ))
        .await
        .unwrap();

    let res = app
        .clone()
        .oneshot(authed_request("GET", "/dashboard?metric=visits&limit=3", &token))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    let values: Vec<f64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["value"].as_f64().unwrap())
        .collect();
    // Most recent three, oldest of the window first.
    assert_eq!(values, vec![20.0, 30.0, 40.0]);
}

#[tokio::test]
async fn test_metric_append_rejects_bad_value() {
    let app = test_app(test_state());
    let token = bootstrap_master(&app).await;

    let res = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/dashboard",
            &token,
            serde_json::json!({ "metricName": "visits", "metricValue": "many" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Non-finite strings parse as f64 but must still be rejected.
    for v in ["NaN", "inf", "-inf"] {
        let res = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/dashboard",
                &token,
                serde_json::json!({ "metricName": "visits", "metricValue": v }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
