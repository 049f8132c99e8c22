//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let media = tempfile::tempdir().unwrap();
    let mut config = common::test_config();
    config.media_root = media.path().to_path_buf();
    let app = common::build_app(pool, config);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["media_available"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_media_root_reports_degraded(pool: PgPool) {
    let mut config = common::test_config();
    config.media_root = "/nonexistent/lao-cinema-media".into();
    let app = common::build_app(pool, config);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["media_available"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn health_is_not_under_api_prefix(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/health").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("response must carry x-request-id");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_allows_anonymous_id_header(pool: PgPool) {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/movies")
        .header("origin", "http://localhost:3001")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-anonymous-id")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-anonymous-id"));
}
