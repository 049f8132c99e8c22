use std::path::PathBuf;

use chrono::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Video/trailer token and anonymous-id signing.
    pub tokens: TokenConfig,
    /// Rental windows and grace period.
    pub rentals: RentalConfig,
    /// Per-identity limits on token minting endpoints.
    pub rate_limit: RateLimitConfig,
    /// Directory that `/stream/{*path}` serves from (default: `./media`).
    pub media_root: PathBuf,
}

/// Secrets and lifetimes for HMAC-signed tokens.
#[derive(Clone)]
pub struct TokenConfig {
    pub stream_secret: String,
    pub video_ttl: Duration,
    pub trailer_ttl: Duration,
    pub anonymous_id_secret: String,
    pub anonymous_id_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("video_ttl", &self.video_ttl)
            .field("trailer_ttl", &self.trailer_ttl)
            .field("anonymous_id_ttl", &self.anonymous_id_ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct RentalConfig {
    /// Length of a single-movie rental.
    pub movie_duration: Duration,
    /// Length of a pack rental.
    pub pack_duration: Duration,
    /// Playback stays allowed this long after a rental expires.
    pub grace_period: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub per_minute: u32,
    pub burst: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `STREAM_TOKEN_SECRET`        | required                |
    /// | `VIDEO_TOKEN_TTL_SECS`       | `14400`                 |
    /// | `TRAILER_TOKEN_TTL_SECS`     | `3600`                  |
    /// | `ANONYMOUS_ID_SECRET`        | required                |
    /// | `ANONYMOUS_ID_TTL_DAYS`      | `365`                   |
    /// | `RENTAL_DURATION_HOURS`      | `48`                    |
    /// | `PACK_RENTAL_DURATION_HOURS` | `168`                   |
    /// | `RENTAL_GRACE_PERIOD_MINS`   | `120`                   |
    /// | `RATE_LIMIT_PER_MINUTE`      | `30`                    |
    /// | `RATE_LIMIT_BURST`           | `10`                    |
    /// | `MEDIA_ROOT`                 | `./media`               |
    ///
    /// # Panics
    ///
    /// Panics on any malformed value or missing secret, so misconfiguration
    /// fails at startup rather than on the first request.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);

        let tokens = TokenConfig {
            stream_secret: required_secret("STREAM_TOKEN_SECRET"),
            video_ttl: Duration::seconds(env_parse("VIDEO_TOKEN_TTL_SECS", 14_400)),
            trailer_ttl: Duration::seconds(env_parse("TRAILER_TOKEN_TTL_SECS", 3_600)),
            anonymous_id_secret: required_secret("ANONYMOUS_ID_SECRET"),
            anonymous_id_ttl: Duration::days(env_parse("ANONYMOUS_ID_TTL_DAYS", 365)),
        };

        let rentals = RentalConfig {
            movie_duration: Duration::hours(env_parse("RENTAL_DURATION_HOURS", 48)),
            pack_duration: Duration::hours(env_parse("PACK_RENTAL_DURATION_HOURS", 168)),
            grace_period: Duration::minutes(env_parse("RENTAL_GRACE_PERIOD_MINS", 120)),
        };

        let rate_limit = RateLimitConfig {
            per_minute: env_parse("RATE_LIMIT_PER_MINUTE", 30),
            burst: env_parse("RATE_LIMIT_BURST", 10),
        };

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".into()));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            tokens,
            rentals,
            rate_limit,
            media_root,
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid: {e}")),
        Err(_) => default,
    }
}

fn required_secret(key: &str) -> String {
    let secret = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set in the environment"));
    assert!(!secret.is_empty(), "{key} must not be empty");
    secret
}
