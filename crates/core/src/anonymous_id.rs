//! Signed anonymous visitor identifiers.
//!
//! Unauthenticated visitors get a UUID that they present as a signed token
//! (`X-Anonymous-Id` header). Rentals and watch progress are keyed on the
//! UUID until the visitor registers, at which point they migrate to the user.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::token::{Expiring, TokenCodec, TokenError};
use crate::types::Timestamp;

/// Claims carried by an anonymous-id token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousClaims {
    /// The visitor's UUID (hyphenated, lowercase).
    pub aid: String,
    pub iat: i64,
    pub exp: i64,
}

impl Expiring for AnonymousClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// A newly issued anonymous id.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedAnonymousId {
    pub anonymous_id: String,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Parse and canonicalize a client-supplied anonymous id.
pub fn parse_client_id(raw: &str) -> Result<String, CoreError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| CoreError::Validation("anonymous_id must be a UUID".into()))
}

/// Sign an anonymous id, generating a fresh one when the client sent none.
pub fn issue(
    codec: &TokenCodec,
    client_id: Option<&str>,
    now: Timestamp,
    ttl: Duration,
) -> Result<IssuedAnonymousId, CoreError> {
    let aid = match client_id {
        Some(raw) => parse_client_id(raw)?,
        None => Uuid::new_v4().hyphenated().to_string(),
    };
    let expires_at = now + ttl;
    let claims = AnonymousClaims {
        aid: aid.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    let token = codec
        .sign(&claims)
        .map_err(|e| CoreError::Internal(format!("anonymous id signing failed: {e}")))?;

    Ok(IssuedAnonymousId {
        anonymous_id: aid,
        token,
        expires_at,
    })
}

/// Verify an anonymous-id token and return the UUID it carries.
pub fn resolve(codec: &TokenCodec, token: &str, now: Timestamp) -> Result<String, TokenError> {
    let claims: AnonymousClaims = codec.verify(token, now)?;
    Uuid::parse_str(&claims.aid).map_err(|_| TokenError::Malformed)?;
    Ok(claims.aid)
}
