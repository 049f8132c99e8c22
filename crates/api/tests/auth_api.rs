//! HTTP-level tests for registration, login, refresh rotation and logout.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, get, get_auth, post_json, send};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_creates_viewer_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "email": "New@Example.com", "password": "long-enough-pw", "display_name": "Noy" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert!(json["data"]["refresh_token"].is_string());
    assert_eq!(json["data"]["user"]["email"], "new@example.com");
    assert_eq!(json["data"]["user"]["role"], "viewer");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_duplicate_email(pool: PgPool) {
    common::create_user(&pool, "taken@example.com", "viewer").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "email": "TAKEN@example.com", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_short_password_and_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "email": "a@example.com", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "email": "not-an-email", "password": "long-enough-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_is_401(pool: PgPool) {
    common::create_user(&pool, "viewer@example.com", "viewer").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "viewer@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    assert_eq!(get(app.clone(), "/api/v1/auth/me").await.status(), StatusCode::UNAUTHORIZED);

    let token = common::token_for(&pool, app.clone(), "me@example.com", "editor").await;
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "me@example.com");
    assert_eq!(json["data"]["role"], "editor");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_and_old_token_is_rejected(pool: PgPool) {
    common::create_user(&pool, "rot@example.com", "viewer").await;
    let app = common::build_test_app(pool);

    let login = body_json(
        post_json(
            app.clone(),
            "/api/v1/auth/login",
            json!({ "email": "rot@example.com", "password": common::TEST_PASSWORD }),
        )
        .await,
    )
    .await;
    let first = login["data"]["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let replay = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": first })).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    common::create_user(&pool, "out@example.com", "viewer").await;
    let app = common::build_test_app(pool);

    let login = body_json(
        post_json(
            app.clone(),
            "/api/v1/auth/login",
            json!({ "email": "out@example.com", "password": common::TEST_PASSWORD }),
        )
        .await,
    )
    .await;
    let access = login["data"]["access_token"].as_str().unwrap();
    let refresh = login["data"]["refresh_token"].as_str().unwrap();

    let response = send(app.clone(), Method::POST, "/api/v1/auth/logout", Some(access), &[], None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(app, "/api/v1/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_bearer_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
