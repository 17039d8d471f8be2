//! Integration tests for the health and debug endpoints, the front end, and
//! general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, body_text, build_test_app, get, memory_app, post_json, send_raw};
use itemhub_db::connection::ConnectionManager;
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_connected_database() {
    let response = get(memory_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
    assert!(json["version"].is_string());
    assert!(json["timestamp"].is_string());
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn health_check_is_ok_while_database_is_down() {
    let response = get(build_test_app(ConnectionManager::new()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "connecting");
}

// ---------------------------------------------------------------------------
// Test: GET /api/debug
// ---------------------------------------------------------------------------

#[tokio::test]
async fn debug_reports_backend_and_item_count() {
    let app = memory_app();
    post_json(
        app.clone(),
        "/api/items",
        json!({"name": "Widget", "description": "d"}),
    )
    .await;

    let response = get(app, "/api/debug").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["reachable"], true);
    assert_eq!(json["item_count"], 1);
    assert_eq!(json["connection"]["state"], "connected");
    assert_eq!(json["settings"]["require_description"], true);
    assert_eq!(json["settings"]["retry_delay_secs"], 5);
}

#[tokio::test]
async fn debug_hides_credentials() {
    let response = get(memory_app(), "/api/debug").await;
    let json = body_json(response).await;

    let target = json["settings"]["database_target"].as_str().unwrap();
    assert!(!target.contains("secret"), "credentials leaked: {target}");
    assert!(target.contains("localhost:27017"));
}

#[tokio::test]
async fn debug_works_without_a_connection() {
    let response = get(build_test_app(ConnectionManager::new()), "/api/debug").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["backend"].is_null());
    assert!(json["reachable"].is_null());
    assert!(json["item_count"].is_null());
    assert_eq!(json["connection"]["state"], "connecting");
}

#[tokio::test]
async fn debug_route_can_be_disabled() {
    let mut config = common::test_config();
    config.enable_debug_routes = false;
    let app = common::build_test_app_with(common::connected_manager(), config);

    let response = get(app, "/api/debug").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: front end is served from the static directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_serves_the_front_end() {
    let response = get(memory_app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "got {content_type}");

    let html = body_text(response).await;
    assert!(html.contains("id=\"itemForm\""));
    assert!(html.contains("/app.js"));
}

#[tokio::test]
async fn script_and_stylesheet_are_served() {
    let app = memory_app();
    assert_eq!(get(app.clone(), "/app.js").await.status(), StatusCode::OK);
    assert_eq!(get(app, "/styles.css").await.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(memory_app(), "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_api_route_returns_json_404() {
    for uri in ["/api/nope", "/api/items/65a1b2c3d4e5f60718293a4b/extra"] {
        let response = get(memory_app(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        assert_eq!(response.headers()["content-type"], "application/json");

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], format!("Route {uri} not found"));
    }
}

// ---------------------------------------------------------------------------
// Test: unsupported methods on known routes return 405 with a JSON body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsupported_method_returns_json_405() {
    let cases = [
        ("PATCH", "/api/items"),
        ("DELETE", "/api/items"),
        ("POST", "/api/items/65a1b2c3d4e5f60718293a4b"),
    ];

    for (method, uri) in cases {
        let response = send_raw(memory_app(), method, uri, "{}").await;
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{method} {uri}"
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(json["error"], format!("Method {method} not allowed"));
    }
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let response = get(memory_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/items")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = memory_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:3000"
    );
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"), "allowed methods: {methods}");
}
