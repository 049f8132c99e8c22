//! HTTP-level tests for rentals, access resolution and anonymous migration.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, post_json_auth, send};
use lao_cinema_core::rental::Renter;
use lao_cinema_db::models::rental::CreateRental;
use lao_cinema_db::repositories::RentalRepo;
use serde_json::json;
use sqlx::PgPool;

const ANON_HEADER: &str = "x-anonymous-id";

async fn published_movie(pool: &PgPool, app: axum::Router, slug: &str) -> i64 {
    let editor = common::token_for(pool, app.clone(), &format!("ed-{slug}@example.com"), "editor").await;
    common::create_movie(
        app,
        &editor,
        json!({
            "slug": slug,
            "status": "published",
            "rental_price_cents": 299,
            "video_path": format!("movies/{slug}/master.m3u8"),
        }),
    )
    .await
}

async fn rent_as_anonymous(app: axum::Router, anon_token: &str, body: serde_json::Value) -> axum::http::Response<axum::body::Body> {
    send(
        app,
        Method::POST,
        "/api/v1/rentals",
        None,
        &[(ANON_HEADER, anon_token)],
        Some(body),
    )
    .await
}

async fn access_json(app: axum::Router, movie_id: i64, anon_token: &str) -> serde_json::Value {
    let response = send(
        app,
        Method::GET,
        &format!("/api/v1/movies/{movie_id}/access"),
        None,
        &[(ANON_HEADER, anon_token)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn anonymous_rental_grants_access_and_blocks_repurchase(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "rentable").await;
    let (_, anon) = common::anonymous_id(app.clone()).await;

    assert_eq!(access_json(app.clone(), movie_id, &anon).await["access"], "none");

    let response = rent_as_anonymous(app.clone(), &anon, json!({ "movie_id": movie_id, "payment_reference": "pay-1" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let rental = body_json(response).await;
    assert_eq!(rental["data"]["amount_cents"], 299);
    assert_eq!(rental["data"]["state"], "active");

    let access = access_json(app.clone(), movie_id, &anon).await;
    assert_eq!(access["access"], "movie");
    assert_eq!(access["in_grace_period"], false);

    let again = rent_as_anonymous(app, &anon, json!({ "movie_id": movie_id })).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rental_is_recorded_at_the_catalogue_price(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "priced").await;
    let (_, anon) = common::anonymous_id(app.clone()).await;

    let cheap = rent_as_anonymous(app.clone(), &anon, json!({ "movie_id": movie_id, "amount_cents": 1 })).await;
    assert_eq!(cheap.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(cheap).await["code"], "VALIDATION_ERROR");

    let wrong_currency = rent_as_anonymous(
        app.clone(),
        &anon,
        json!({ "movie_id": movie_id, "amount_cents": 299, "currency": "LAK" }),
    )
    .await;
    assert_eq!(wrong_currency.status(), StatusCode::BAD_REQUEST);

    // Nothing was recorded by the rejected attempts.
    assert_eq!(access_json(app.clone(), movie_id, &anon).await["access"], "none");

    let response = rent_as_anonymous(
        app,
        &anon,
        json!({ "movie_id": movie_id, "amount_cents": 299, "currency": "USD" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let rental = body_json(response).await;
    assert_eq!(rental["data"]["amount_cents"], 299);
    assert_eq!(rental["data"]["currency"], "USD");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rental_needs_exactly_one_target_and_a_renter(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "target").await;
    let (_, anon) = common::anonymous_id(app.clone()).await;

    let both = rent_as_anonymous(app.clone(), &anon, json!({ "movie_id": movie_id, "pack_id": 1 })).await;
    assert_eq!(both.status(), StatusCode::BAD_REQUEST);

    let neither = rent_as_anonymous(app.clone(), &anon, json!({})).await;
    assert_eq!(neither.status(), StatusCode::BAD_REQUEST);

    let nobody = common::post_json(app, "/api/v1/rentals", json!({ "movie_id": movie_id })).await;
    assert_eq!(nobody.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn pack_rental_unlocks_member_movies(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let inside = published_movie(&pool, app.clone(), "short-one").await;
    let outside = published_movie(&pool, app.clone(), "feature").await;
    let editor = common::token_for(&pool, app.clone(), "packer@example.com", "editor").await;

    let pack = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/packs",
            &editor,
            json!({
                "slug": "shorts-vol-1",
                "price_cents": 499,
                "is_published": true,
                "translations": [{ "language": "en", "title": "Shorts Vol. 1" }],
            }),
        )
        .await,
    )
    .await;
    let pack_id = pack["data"]["id"].as_i64().unwrap();
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/packs/{pack_id}/items"),
        &editor,
        json!({ "movie_id": inside }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let (_, anon) = common::anonymous_id(app.clone()).await;
    let response = rent_as_anonymous(app.clone(), &anon, json!({ "pack_id": pack_id })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let access = access_json(app.clone(), inside, &anon).await;
    assert_eq!(access["access"], "pack");
    assert_eq!(access["pack_id"], pack_id);
    assert_eq!(access_json(app, outside, &anon).await["access"], "none");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rental_in_grace_period_is_playable_and_renewable(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "graceful").await;
    let (aid, anon) = common::anonymous_id(app.clone()).await;

    // Expired half an hour ago; the test grace period is two hours.
    RentalRepo::create(
        &pool,
        &CreateRental {
            user_id: None,
            anonymous_id: Some(aid.clone()),
            movie_id: Some(movie_id),
            pack_id: None,
            payment_reference: None,
            amount_cents: 299,
            currency: "USD".into(),
            purchased_at: Utc::now() - Duration::days(2),
            expires_at: Utc::now() - Duration::minutes(30),
        },
    )
    .await
    .unwrap();

    let access = access_json(app.clone(), movie_id, &anon).await;
    assert_eq!(access["access"], "movie");
    assert_eq!(access["in_grace_period"], true);

    let renewed = rent_as_anonymous(app, &anon, json!({ "movie_id": movie_id })).await;
    assert_eq!(renewed.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_with_anonymous_id_migrates_rentals(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "migrating").await;
    let (aid, anon) = common::anonymous_id(app.clone()).await;
    rent_as_anonymous(app.clone(), &anon, json!({ "movie_id": movie_id })).await;

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/auth/register",
        None,
        &[(ANON_HEADER, anon.as_str())],
        Some(json!({ "email": "convert@example.com", "password": "long-enough-pw" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["migrated"]["rentals"], 1);
    let user_id = json["data"]["user"]["id"].as_i64().unwrap();
    let access_token = json["data"]["access_token"].as_str().unwrap().to_string();

    let cutoff = Utc::now() - Duration::hours(2);
    let anon_rentals = RentalRepo::list_for_renter(&pool, &Renter::Anonymous(aid), true, cutoff)
        .await
        .unwrap();
    assert!(anon_rentals.is_empty());
    let user_rentals = RentalRepo::list_for_renter(&pool, &Renter::User(user_id), true, cutoff)
        .await
        .unwrap();
    assert_eq!(user_rentals.len(), 1);

    let response = common::get_auth(app, &format!("/api/v1/movies/{movie_id}/access"), &access_token).await;
    assert_eq!(body_json(response).await["data"]["access"], "movie");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tampered_anonymous_id_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let movie_id = published_movie(&pool, app.clone(), "guarded").await;
    let (_, anon) = common::anonymous_id(app.clone()).await;
    let tampered = format!("{anon}x");

    let response = send(
        app,
        Method::GET,
        &format!("/api/v1/movies/{movie_id}/access"),
        None,
        &[(ANON_HEADER, tampered.as_str())],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
