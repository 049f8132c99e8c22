//! Query parameter types shared by several handler modules.

use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::HeaderMap;
use lao_cinema_core::locale::Language;
use lao_cinema_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use serde::Deserialize;

use crate::error::AppResult;

/// `?limit=&offset=`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.offset)
    }
}

/// `?lang=` override for the display language of localised fields.
#[derive(Debug, Default, Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

impl LangParams {
    /// `?lang=` wins over `Accept-Language`; English when neither is usable.
    /// An unsupported `?lang=` is a validation error, an unsupported header
    /// is ignored.
    pub fn resolve(&self, headers: &HeaderMap) -> AppResult<Language> {
        if let Some(code) = self.lang.as_deref() {
            return Ok(Language::parse(code)?);
        }
        Ok(headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Language::from_accept_language)
            .unwrap_or(Language::En))
    }
}

/// `?include_expired=true` on rental listings.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeExpiredParams {
    #[serde(default)]
    pub include_expired: bool,
}
