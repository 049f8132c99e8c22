//! Claims for video and trailer streaming tokens.
//!
//! Both token kinds are signed by the same [`TokenCodec`] and tagged with a
//! `purpose` field, so a trailer token can never be presented where a video
//! token is required. A video token unlocks the movie's own media directory
//! (`path` ends in `/`): HLS playlists and their segments live side by side
//! under that prefix. A trailer token unlocks exactly one file.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::rental::Renter;
use crate::token::{Expiring, TokenCodec, TokenError};
use crate::types::{DbId, Timestamp};

/// Claims for full-movie playback. Minted only after rental access resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoClaims {
    pub movie_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
    /// Media path prefix this token unlocks.
    pub path: String,
    pub exp: i64,
}

/// Claims for hosted trailer playback. No rental is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerClaims {
    pub trailer_id: DbId,
    pub movie_id: DbId,
    /// The single trailer file this token unlocks.
    pub path: String,
    pub exp: i64,
}

/// Any token accepted by the stream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum StreamClaims {
    Video(VideoClaims),
    Trailer(TrailerClaims),
}

impl StreamClaims {
    pub fn path(&self) -> &str {
        match self {
            StreamClaims::Video(c) => &c.path,
            StreamClaims::Trailer(c) => &c.path,
        }
    }

    pub fn movie_id(&self) -> DbId {
        match self {
            StreamClaims::Video(c) => c.movie_id,
            StreamClaims::Trailer(c) => c.movie_id,
        }
    }
}

impl Expiring for StreamClaims {
    fn expires_at(&self) -> i64 {
        match self {
            StreamClaims::Video(c) => c.exp,
            StreamClaims::Trailer(c) => c.exp,
        }
    }
}

/// A freshly minted token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Expiry for a video token: `now + ttl`, but never past the end of the
/// viewer's access window (rental expiry plus grace period).
pub fn video_token_expiry(now: Timestamp, ttl: Duration, access_until: Timestamp) -> Timestamp {
    (now + ttl).min(access_until)
}

/// Mint a video token for `renter`.
pub fn issue_video_token(
    codec: &TokenCodec,
    movie_id: DbId,
    renter: &Renter,
    video_path: &str,
    now: Timestamp,
    ttl: Duration,
    access_until: Timestamp,
) -> Result<IssuedToken, serde_json::Error> {
    let expires_at = video_token_expiry(now, ttl, access_until);
    let (user_id, anonymous_id) = match renter {
        Renter::User(id) => (Some(*id), None),
        Renter::Anonymous(aid) => (None, Some(aid.clone())),
    };
    let claims = StreamClaims::Video(VideoClaims {
        movie_id,
        user_id,
        anonymous_id,
        path: media_prefix(video_path),
        exp: expires_at.timestamp(),
    });
    Ok(IssuedToken {
        token: codec.sign(&claims)?,
        expires_at,
    })
}

/// Mint a trailer token scoped to the trailer file itself.
pub fn issue_trailer_token(
    codec: &TokenCodec,
    trailer_id: DbId,
    movie_id: DbId,
    video_path: &str,
    now: Timestamp,
    ttl: Duration,
) -> Result<IssuedToken, serde_json::Error> {
    let expires_at = now + ttl;
    let claims = StreamClaims::Trailer(TrailerClaims {
        trailer_id,
        movie_id,
        path: video_path.trim_start_matches('/').to_string(),
        exp: expires_at.timestamp(),
    });
    Ok(IssuedToken {
        token: codec.sign(&claims)?,
        expires_at,
    })
}

/// Verify a token that must be a video token.
pub fn verify_video_token(
    codec: &TokenCodec,
    token: &str,
    now: Timestamp,
) -> Result<VideoClaims, TokenError> {
    match codec.verify::<StreamClaims>(token, now)? {
        StreamClaims::Video(claims) => Ok(claims),
        StreamClaims::Trailer(_) => Err(TokenError::WrongPurpose),
    }
}

/// Verify a token that must be a trailer token.
pub fn verify_trailer_token(
    codec: &TokenCodec,
    token: &str,
    now: Timestamp,
) -> Result<TrailerClaims, TokenError> {
    match codec.verify::<StreamClaims>(token, now)? {
        StreamClaims::Trailer(claims) => Ok(claims),
        StreamClaims::Video(_) => Err(TokenError::WrongPurpose),
    }
}

/// Directory prefix (with trailing `/`) containing `video_path`.
///
/// A bare file name with no directory unlocks only itself.
pub fn media_prefix(video_path: &str) -> String {
    media_dir(video_path).unwrap_or_else(|| video_path.trim_start_matches('/').to_string())
}

/// Parent directory of `video_path` with a trailing `/`, or `None` for a
/// bare file name.
pub fn media_dir(video_path: &str) -> Option<String> {
    let trimmed = video_path.trim_start_matches('/');
    trimmed.rfind('/').map(|idx| trimmed[..=idx].to_string())
}

/// Validate a requested media path: relative, forward slashes only, no empty,
/// `.` or `..` segments.
pub fn normalize_media_path(requested: &str) -> Option<&str> {
    if requested.is_empty() || requested.starts_with('/') || requested.contains('\\') {
        return None;
    }
    if requested
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return None;
    }
    Some(requested)
}

/// Whether the token's `prefix` grants access to `requested`.
pub fn path_is_covered(prefix: &str, requested: &str) -> bool {
    let Some(requested) = normalize_media_path(requested) else {
        return false;
    };
    if prefix.is_empty() {
        return false;
    }
    if prefix.ends_with('/') {
        requested.starts_with(prefix)
    } else {
        requested == prefix
    }
}
