//! JWT access tokens and opaque refresh tokens.
//!
//! Access tokens are HS256-signed JWTs carrying [`Claims`]. Refresh tokens
//! are random UUIDs; sessions store only their SHA-256 hex digest and a
//! token is rotated every time it is exchanged.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lao_cinema_core::types::DbId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// Role at the time the token was minted (`admin`, `editor`, `viewer`).
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique token id, recorded in logs.
    pub jti: String,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish_non_exhaustive()
    }
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

impl JwtConfig {
    /// Load from `JWT_SECRET`, `JWT_ACCESS_EXPIRY_MINS` (15) and
    /// `JWT_REFRESH_EXPIRY_DAYS` (30).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or an expiry is not an integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }

    /// When a refresh token minted at `now` stops working.
    pub fn refresh_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::days(self.refresh_token_expiry_days)
    }
}

/// Mint an HS256 access token for `user_id` with `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry of an access token.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// New refresh token as `(plaintext, sha256_hex)`. Only the hash is stored.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        }
    }

    #[test]
    fn access_token_carries_user_and_role() {
        let cfg = config("jwt-test-secret");
        let token = generate_access_token(7, "editor", &cfg).unwrap();

        let claims = validate_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "editor");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let cfg = config("jwt-test-secret");
        // Beyond the default 60 second leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "viewer".into(),
            exp: now - 300,
            iat: now - 900,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &cfg).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = generate_access_token(1, "viewer", &config("alpha")).unwrap();
        assert!(validate_token(&token, &config("bravo")).is_err());
    }

    #[test]
    fn refresh_hash_is_stable_hex() {
        let (plaintext, hash) = generate_refresh_token();
        assert_eq!(hash_refresh_token(&plaintext), hash);
        assert_eq!(hash.len(), 64);
        assert_ne!(plaintext, hash);
    }

    #[test]
    fn refresh_expiry_uses_configured_days() {
        let cfg = config("s");
        let now = Utc::now();
        assert_eq!(cfg.refresh_expiry(now), now + chrono::Duration::days(30));
    }
}
