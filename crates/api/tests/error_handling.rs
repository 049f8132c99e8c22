//! `AppError` to HTTP response mapping, exercised without a server.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use lao_cinema_api::error::AppError;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::token::{TokenError, INVALID_TOKEN_MESSAGE};

async fn error_to_response(err: AppError) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, _, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Movie",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Movie with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, _, json) =
        error_to_response(AppError::Core(CoreError::Validation("bad slug".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad slug");
}

#[tokio::test]
async fn rental_required_returns_403_with_its_own_code() {
    let (status, _, json) =
        error_to_response(AppError::Core(CoreError::RentalRequired("rent it".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "RENTAL_REQUIRED");
}

#[tokio::test]
async fn rate_limited_sets_retry_after() {
    let (status, headers, json) =
        error_to_response(AppError::RateLimited { retry_after_secs: 17 }).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(headers.get("retry-after").unwrap(), "17");
}

#[tokio::test]
async fn every_token_failure_has_the_same_message() {
    for err in [
        TokenError::Malformed,
        TokenError::BadSignature,
        TokenError::Expired,
        TokenError::WrongPurpose,
    ] {
        let (status, _, json) = error_to_response(AppError::from(err)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], INVALID_TOKEN_MESSAGE);
    }
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let (status, _, json) =
        error_to_response(AppError::InternalError("connection string leaked".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, _, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
