//! Token minting and byte-range media delivery.

mod common;

use axum::http::header::{CONTENT_RANGE, RANGE, RETRY_AFTER};
use axum::http::{Method, StatusCode};
use axum::Router;
use common::{body_bytes, body_json, send};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;

const ANON_HEADER: &str = "x-anonymous-id";
const PLAYLIST: &[u8] = b"#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:4.0,\nseg0.ts\n#EXT-X-ENDLIST\n";

/// A media root holding two movies' files.
fn media_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for slug in ["river", "other"] {
        let movie_dir = dir.path().join("movies").join(slug);
        std::fs::create_dir_all(&movie_dir).unwrap();
        std::fs::write(movie_dir.join("master.m3u8"), PLAYLIST).unwrap();
        std::fs::write(movie_dir.join("seg0.ts"), vec![7u8; 4096]).unwrap();
    }
    let trailer_dir = dir.path().join("trailers").join("river");
    std::fs::create_dir_all(&trailer_dir).unwrap();
    std::fs::write(trailer_dir.join("teaser.mp4"), vec![1u8; 2048]).unwrap();
    dir
}

fn app_with_media(pool: &PgPool, media: &TempDir) -> Router {
    let mut config = common::test_config();
    config.media_root = media.path().to_path_buf();
    common::build_app(pool.clone(), config)
}

async fn movie(pool: &PgPool, app: Router, slug: &str) -> i64 {
    let editor = common::token_for(pool, app.clone(), &format!("{slug}-ed@example.com"), "editor").await;
    common::create_movie(
        app,
        &editor,
        json!({
            "slug": slug,
            "status": "published",
            "rental_price_cents": 199,
            "video_path": format!("movies/{slug}/master.m3u8"),
        }),
    )
    .await
}

/// Rent `movie_id` as a fresh anonymous visitor and return their id token.
async fn rented(app: Router, movie_id: i64) -> String {
    let (_, anon) = common::anonymous_id(app.clone()).await;
    let response = send(
        app,
        Method::POST,
        "/api/v1/rentals",
        None,
        &[(ANON_HEADER, anon.as_str())],
        Some(json!({ "movie_id": movie_id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    anon
}

async fn video_token(app: Router, movie_id: i64, anon: &str) -> axum::http::Response<axum::body::Body> {
    send(
        app,
        Method::POST,
        &format!("/api/v1/movies/{movie_id}/video-token"),
        None,
        &[(ANON_HEADER, anon)],
        None,
    )
    .await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn video_token_requires_rental(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let movie_id = movie(&pool, app.clone(), "river").await;
    let (_, anon) = common::anonymous_id(app.clone()).await;

    let response = video_token(app, movie_id, &anon).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "RENTAL_REQUIRED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rented_movie_streams_whole_files_and_ranges(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let movie_id = movie(&pool, app.clone(), "river").await;
    let anon = rented(app.clone(), movie_id).await;

    let response = video_token(app.clone(), movie_id, &anon).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let stream_url = json["data"]["stream_url"].as_str().unwrap().to_string();
    let token = json["data"]["token"].as_str().unwrap().to_string();
    assert!(stream_url.starts_with("/api/v1/stream/movies/river/master.m3u8?token="));

    let response = common::get(app.clone(), &stream_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.apple.mpegurl"
    );
    assert_eq!(body_bytes(response).await, PLAYLIST);

    // Segments next to the playlist are covered by the same token.
    let segment = format!("/api/v1/stream/movies/river/seg0.ts?token={token}");
    let response = send(app.clone(), Method::GET, &segment, None, &[(RANGE.as_str(), "bytes=100-199")], None).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes 100-199/4096");
    assert_eq!(body_bytes(response).await.len(), 100);

    let response = send(app, Method::GET, &segment, None, &[(RANGE.as_str(), "bytes=5000-")], None).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[CONTENT_RANGE], "bytes */4096");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stream_rejects_bad_tokens_and_foreign_paths(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let movie_id = movie(&pool, app.clone(), "river").await;
    movie(&pool, app.clone(), "other").await;
    let anon = rented(app.clone(), movie_id).await;
    let token = body_json(video_token(app.clone(), movie_id, &anon).await).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let missing = common::get(app.clone(), "/api/v1/stream/movies/river/seg0.ts").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = common::get(app.clone(), "/api/v1/stream/movies/river/seg0.ts?token=abc.def").await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);

    let foreign = common::get(app.clone(), &format!("/api/v1/stream/movies/other/seg0.ts?token={token}")).await;
    assert_eq!(foreign.status(), StatusCode::UNAUTHORIZED);

    let escape = common::get(app, &format!("/api/v1/stream/movies/river/../other/seg0.ts?token={token}")).await;
    assert_eq!(escape.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn hosted_trailers_get_tokens_youtube_trailers_do_not(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let editor = common::token_for(&pool, app.clone(), "trailers@example.com", "editor").await;
    let movie_id = common::create_movie(
        app.clone(),
        &editor,
        json!({ "slug": "river", "status": "published", "video_path": "movies/river/master.m3u8" }),
    )
    .await;

    let hosted = body_json(
        common::post_json_auth(
            app.clone(),
            &format!("/api/v1/movies/{movie_id}/trailers"),
            &editor,
            json!({ "kind": "hosted", "video_path": "trailers/river/teaser.mp4" }),
        )
        .await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();
    let youtube = body_json(
        common::post_json_auth(
            app.clone(),
            &format!("/api/v1/movies/{movie_id}/trailers"),
            &editor,
            json!({ "kind": "youtube", "youtube_key": "dQw4w9WgXcQ" }),
        )
        .await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();

    // No rental needed for trailers.
    let response = send(app.clone(), Method::POST, &format!("/api/v1/trailers/{hosted}/token"), None, &[], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stream_url = body_json(response).await["data"]["stream_url"]
        .as_str()
        .unwrap()
        .to_string();
    let response = common::get(app.clone(), &stream_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await.len(), 2048);

    let response = send(app, Method::POST, &format!("/api/v1/trailers/{youtube}/token"), None, &[], None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trailer_token_does_not_unlock_the_movie_beside_it(pool: PgPool) {
    let media = media_root();
    std::fs::write(media.path().join("movies/river/trailer.mp4"), vec![3u8; 512]).unwrap();
    let app = app_with_media(&pool, &media);
    let editor = common::token_for(&pool, app.clone(), "sibling@example.com", "editor").await;
    let movie_id = movie(&pool, app.clone(), "river").await;

    let trailer = body_json(
        common::post_json_auth(
            app.clone(),
            &format!("/api/v1/movies/{movie_id}/trailers"),
            &editor,
            json!({ "kind": "hosted", "video_path": "movies/river/trailer.mp4" }),
        )
        .await,
    )
    .await["data"]["id"]
        .as_i64()
        .unwrap();
    let response = send(app.clone(), Method::POST, &format!("/api/v1/trailers/{trailer}/token"), None, &[], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let own = common::get(app.clone(), &format!("/api/v1/stream/movies/river/trailer.mp4?token={token}")).await;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body_bytes(own).await.len(), 512);

    for sibling in ["movies/river/master.m3u8", "movies/river/seg0.ts"] {
        let response = common::get(app.clone(), &format!("/api/v1/stream/{sibling}?token={token}")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{sibling}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rental_of_one_movie_does_not_unlock_another(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let river = movie(&pool, app.clone(), "river").await;
    let other = movie(&pool, app.clone(), "other").await;
    let anon = rented(app.clone(), river).await;

    let token = body_json(video_token(app.clone(), river, &anon).await).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    let response = common::get(app.clone(), &format!("/api/v1/stream/movies/other/master.m3u8?token={token}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The same visitor still needs their own rental for the second movie.
    let response = video_token(app, other, &anon).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn movies_cannot_share_a_media_directory(pool: PgPool) {
    let media = media_root();
    let app = app_with_media(&pool, &media);
    let editor = common::token_for(&pool, app.clone(), "layout@example.com", "editor").await;

    // A bare file has no directory to scope a token to.
    let response = common::post_json_auth(
        app.clone(),
        "/api/v1/movies",
        &editor,
        json!({ "slug": "bare", "video_path": "bare.mp4" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let flat = common::create_movie(
        app.clone(),
        &editor,
        json!({ "slug": "flat-a", "video_path": "flat/a.mp4" }),
    )
    .await;
    for (slug, path) in [("flat-b", "flat/b.mp4"), ("nested", "flat/b/master.m3u8")] {
        let response = common::post_json_auth(
            app.clone(),
            "/api/v1/movies",
            &editor,
            json!({ "slug": slug, "video_path": path }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT, "{path}");
    }

    let river = movie(&pool, app.clone(), "river").await;
    let response = common::put_json_auth(
        app.clone(),
        &format!("/api/v1/movies/{river}"),
        &editor,
        json!({ "video_path": "movies/river/extras/master.m3u8" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = common::put_json_auth(
        app,
        &format!("/api/v1/movies/{flat}"),
        &editor,
        json!({ "video_path": "movies/river/alt.m3u8" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn token_minting_is_rate_limited(pool: PgPool) {
    let media = media_root();
    let mut config = common::test_config();
    config.media_root = media.path().to_path_buf();
    config.rate_limit.per_minute = 1;
    config.rate_limit.burst = 0;
    let app = common::build_app(pool.clone(), config);

    let movie_id = movie(&pool, app.clone(), "river").await;
    let anon = rented(app.clone(), movie_id).await;

    let first = video_token(app.clone(), movie_id, &anon).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = video_token(app, movie_id, &anon).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(RETRY_AFTER));
}
