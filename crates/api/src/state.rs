use std::sync::Arc;

use lao_cinema_core::rate_limit::FixedWindowLimiter;
use lao_cinema_core::token::TokenCodec;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lao_cinema_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Signs video and trailer tokens.
    pub stream_codec: Arc<TokenCodec>,
    /// Signs anonymous-id tokens.
    pub anonymous_codec: Arc<TokenCodec>,
    /// Per-identity limiter for token minting endpoints.
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    /// Build state from a pool and configuration, deriving the codecs and
    /// limiter from the configured secrets and limits.
    pub fn new(pool: lao_cinema_db::DbPool, config: ServerConfig) -> Self {
        let stream_codec = Arc::new(TokenCodec::new(&config.tokens.stream_secret));
        let anonymous_codec = Arc::new(TokenCodec::new(&config.tokens.anonymous_id_secret));
        let rate_limiter = Arc::new(FixedWindowLimiter::per_minute(
            config.rate_limit.per_minute,
            config.rate_limit.burst,
        ));
        Self {
            pool,
            config: Arc::new(config),
            stream_codec,
            anonymous_codec,
            rate_limiter,
        }
    }
}
