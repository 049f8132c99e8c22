#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use lao_cinema_api::auth::jwt::JwtConfig;
use lao_cinema_api::auth::password::hash_password;
use lao_cinema_api::config::{RateLimitConfig, RentalConfig, ServerConfig, TokenConfig};
use lao_cinema_api::router::build_app_router;
use lao_cinema_api::state::AppState;
use lao_cinema_db::models::user::CreateUser;
use lao_cinema_db::repositories::UserRepo;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test configuration with fixed secrets and a generous rate limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        tokens: TokenConfig {
            stream_secret: "test-stream-secret".to_string(),
            video_ttl: Duration::hours(4),
            trailer_ttl: Duration::hours(1),
            anonymous_id_secret: "test-anonymous-secret".to_string(),
            anonymous_id_ttl: Duration::days(365),
        },
        rentals: RentalConfig {
            movie_duration: Duration::hours(48),
            pack_duration: Duration::hours(168),
            grace_period: Duration::hours(2),
        },
        rate_limit: RateLimitConfig {
            per_minute: 100,
            burst: 0,
        },
        media_root: PathBuf::from("./media"),
    }
}

pub fn build_app(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, test_config())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send a request with optional bearer token, extra headers and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    headers: &[(&str, &str)],
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, &[], None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), &[], None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, &[], Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), &[], Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), &[], Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), &[], None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            display_name: None,
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a user with `role` and return an access token for them.
pub async fn token_for(pool: &PgPool, app: Router, email: &str, role: &str) -> String {
    create_user(pool, email, role).await;
    login(app, email).await
}

/// Create a movie through the API as `editor_token`.
pub async fn create_movie(app: Router, editor_token: &str, body: serde_json::Value) -> i64 {
    let response = post_json_auth(app, "/api/v1/movies", editor_token, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Issue a signed anonymous id and return `(anonymous_id, token)`.
pub async fn anonymous_id(app: Router) -> (String, String) {
    let response = send(app, Method::POST, "/api/v1/anonymous-id", None, &[], None).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["data"]["anonymous_id"].as_str().unwrap().to_string(),
        json["data"]["token"].as_str().unwrap().to_string(),
    )
}
