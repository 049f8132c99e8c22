//! Streaming gate: token minting for movies and hosted trailers, and the
//! token-checked file server behind `/stream/{*path}`.
//!
//! Files are served from the configured media root with HTTP range support.
//! Every token failure, including a path outside the token's prefix, is
//! reported with the same 401 message.

use std::path::{Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::stream_token::{
    issue_trailer_token, issue_video_token, path_is_covered, IssuedToken, StreamClaims,
};
use lao_cinema_core::token::{TokenError, INVALID_TOKEN_MESSAGE};
use lao_cinema_core::types::{DbId, Timestamp};
use lao_cinema_core::validation::trailer_kind;
use lao_cinema_db::repositories::TrailerRepo;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::movies::load_visible_movie;
use super::not_found;
use super::rentals::resolve_movie_access;
use crate::error::{AppError, AppResult};
use crate::middleware::rate_limit;
use crate::middleware::viewer::Viewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest chunk served for an open-ended range (1 MiB).
const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct StreamTokenResponse {
    pub token: String,
    pub expires_at: Timestamp,
    /// Relative URL of the entry file with the token attached.
    pub stream_url: String,
}

impl StreamTokenResponse {
    fn new(issued: IssuedToken, video_path: &str) -> Self {
        let path = video_path.trim_start_matches('/');
        Self {
            stream_url: format!("/api/v1/stream/{path}?token={}", issued.token),
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Token minting
// ---------------------------------------------------------------------------

/// POST /api/v1/movies/{id}/video-token
///
/// Mint a video token for a movie the caller has a playable rental for.
/// The token expires at the earlier of its TTL and the end of the rental's
/// grace period.
pub async fn video_token(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(movie_id): Path<DbId>,
) -> AppResult<Json<DataResponse<StreamTokenResponse>>> {
    rate_limit::enforce(&state, &viewer)?;
    let renter = viewer.require_renter()?;
    let movie = load_visible_movie(&state, &viewer, movie_id).await?;

    let now = Utc::now();
    let grace = state.config.rentals.grace_period;
    let access = resolve_movie_access(&state, &renter, movie_id, now).await?;
    let Some(access_until) = access.playable_until(grace) else {
        return Err(AppError::Core(CoreError::RentalRequired(
            "A rental is required to watch this movie".into(),
        )));
    };

    let video_path = movie
        .video_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| not_found("Video", movie_id))?;

    let issued = issue_video_token(
        &state.stream_codec,
        movie_id,
        &renter,
        video_path,
        now,
        state.config.tokens.video_ttl,
        access_until,
    )
    .map_err(|e| AppError::InternalError(format!("Video token signing failed: {e}")))?;

    tracing::info!(
        movie_id,
        renter = %renter.rate_limit_key(),
        expires_at = %issued.expires_at,
        "Video token issued"
    );
    Ok(Json(DataResponse {
        data: StreamTokenResponse::new(issued, video_path),
    }))
}

/// POST /api/v1/trailers/{id}/token
///
/// Mint a token for a hosted trailer. No rental is needed, but the movie
/// must be visible to the caller.
pub async fn trailer_token(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(trailer_id): Path<DbId>,
) -> AppResult<Json<DataResponse<StreamTokenResponse>>> {
    rate_limit::enforce(&state, &viewer)?;

    let trailer = TrailerRepo::find_by_id(&state.pool, trailer_id)
        .await?
        .ok_or_else(|| not_found("Trailer", trailer_id))?;
    load_visible_movie(&state, &viewer, trailer.movie_id).await?;

    let video_path = match (trailer.kind.as_str(), trailer.video_path.as_deref()) {
        (trailer_kind::HOSTED, Some(path)) if !path.is_empty() => path,
        _ => {
            return Err(AppError::BadRequest(
                "Only hosted trailers are streamed".into(),
            ))
        }
    };

    let issued = issue_trailer_token(
        &state.stream_codec,
        trailer.id,
        trailer.movie_id,
        video_path,
        Utc::now(),
        state.config.tokens.trailer_ttl,
    )
    .map_err(|e| AppError::InternalError(format!("Trailer token signing failed: {e}")))?;

    Ok(Json(DataResponse {
        data: StreamTokenResponse::new(issued, video_path),
    }))
}

// ---------------------------------------------------------------------------
// File serving
// ---------------------------------------------------------------------------

fn content_type_for_extension(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "m3u8" => "application/vnd.apple.mpegurl",
        "ts" => "video/mp2t",
        "mp4" => "video/mp4",
        "m4s" => "video/iso.segment",
        "vtt" => "text/vtt",
        "webm" => "video/webm",
        "aac" => "audio/aac",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// A parsed `Range: bytes=...` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// `bytes=START-` or `bytes=START-END`.
    From { start: u64, end: Option<u64> },
    /// `bytes=-N`: the last N bytes.
    Suffix(u64),
}

/// Parse a single-range header. Multi-range requests are not supported and
/// yield `None`, so the full file is served.
fn parse_range_header(range: &str) -> Option<ByteRange> {
    let range = range.trim().strip_prefix("bytes=")?;
    if range.contains(',') {
        return None;
    }
    let (start, end) = range.split_once('-')?;
    if start.is_empty() {
        return end.parse::<u64>().ok().map(ByteRange::Suffix);
    }
    let start = start.parse::<u64>().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse::<u64>().ok()?)
    };
    Some(ByteRange::From { start, end })
}

/// Resolve a range against the file size to inclusive `(start, end)`, or
/// `None` when it cannot be satisfied.
fn satisfiable_range(range: ByteRange, file_size: u64) -> Option<(u64, u64)> {
    if file_size == 0 {
        return None;
    }
    let last = file_size - 1;
    match range {
        ByteRange::Suffix(0) => None,
        ByteRange::Suffix(len) => Some((file_size.saturating_sub(len), last)),
        ByteRange::From { start, end } => {
            let end = end
                .map(|e| e.min(last))
                .unwrap_or_else(|| (start.saturating_add(MAX_CHUNK_SIZE - 1)).min(last));
            (start <= end).then_some((start, end))
        }
    }
}

fn media_file(root: &FsPath, requested: &str) -> PathBuf {
    requested.split('/').fold(root.to_path_buf(), |p, seg| p.join(seg))
}

fn io_error(e: std::io::Error) -> AppError {
    AppError::InternalError(e.to_string())
}

fn build(builder: axum::http::response::Builder, body: Body) -> AppResult<Response> {
    builder
        .body(body)
        .map_err(|e| AppError::InternalError(format!("Response build failed: {e}")))
}

/// GET /api/v1/stream/{*path}?token=...
pub async fn stream_file(
    State(state): State<AppState>,
    Path(requested): Path<String>,
    Query(params): Query<StreamParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let token = params.token.as_deref().ok_or(TokenError::Malformed)?;
    let claims: StreamClaims = state.stream_codec.verify(token, Utc::now())?;

    if !path_is_covered(claims.path(), &requested) {
        tracing::warn!(
            movie_id = claims.movie_id(),
            requested = %requested,
            "Stream path outside token prefix"
        );
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_TOKEN_MESSAGE.into(),
        )));
    }

    let path = media_file(&state.config.media_root, &requested);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(not_found("MediaFile", claims.movie_id())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(not_found("MediaFile", claims.movie_id()))
        }
        Err(e) => return Err(io_error(e)),
    };
    let file_size = metadata.len();
    let content_type = content_type_for_extension(&requested);

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);

    if let Some(range) = range {
        let Some((start, end)) = satisfiable_range(range, file_size) else {
            return build(
                Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(header::CONTENT_RANGE, format!("bytes */{file_size}")),
                Body::empty(),
            );
        };

        let length = end - start + 1;
        let mut file = tokio::fs::File::open(&path).await.map_err(io_error)?;
        file.seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(io_error)?;
        let stream = ReaderStream::new(file.take(length));

        return build(
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{file_size}"),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CACHE_CONTROL, "private, no-store"),
            Body::from_stream(stream),
        );
    }

    let file = tokio::fs::File::open(&path).await.map_err(io_error)?;
    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, file_size.to_string())
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CACHE_CONTROL, "private, no-store"),
        Body::from_stream(ReaderStream::new(file)),
    )
}
