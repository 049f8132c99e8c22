//! Field validators for catalogue input.
//!
//! Handlers call these before touching the database so bad input surfaces as
//! a 400 instead of a constraint violation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::Cents;

/// Lowercase ASCII words separated by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// ISO 4217-style currency code.
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));

pub const MAX_SLUG_LEN: usize = 120;
pub const MAX_TITLE_LEN: usize = 300;
pub const MAX_RUNTIME_MINUTES: i32 = 1_000;

/// Movie publication states. Must match `ck_movies_status`.
pub mod movie_status {
    pub const DRAFT: &str = "draft";
    pub const PUBLISHED: &str = "published";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: &[&str] = &[DRAFT, PUBLISHED, ARCHIVED];
}

/// Image kinds. Must match `ck_movie_images_kind`.
pub mod image_kind {
    pub const POSTER: &str = "poster";
    pub const BACKDROP: &str = "backdrop";
    pub const LOGO: &str = "logo";

    pub const ALL: &[&str] = &[POSTER, BACKDROP, LOGO];
}

/// Trailer kinds. Must match `ck_trailers_kind`.
pub mod trailer_kind {
    pub const YOUTUBE: &str = "youtube";
    pub const HOSTED: &str = "hosted";
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be between 1 and {MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(
            "Slug may only contain lowercase letters, digits and single hyphens".into(),
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_runtime(minutes: Option<i32>) -> Result<(), CoreError> {
    match minutes {
        Some(m) if m <= 0 || m > MAX_RUNTIME_MINUTES => Err(CoreError::Validation(format!(
            "Runtime must be between 1 and {MAX_RUNTIME_MINUTES} minutes"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_price_cents(cents: Option<Cents>) -> Result<(), CoreError> {
    match cents {
        Some(c) if c < 0 => Err(CoreError::Validation("Price must not be negative".into())),
        _ => Ok(()),
    }
}

pub fn validate_currency(code: &str) -> Result<(), CoreError> {
    if CURRENCY_RE.is_match(code) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Currency must be a three-letter uppercase code".into(),
        ))
    }
}

pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Expected one of: {}",
            allowed.join(", ")
        )))
    }
}

/// Relative media path under the media root (no leading slash, no `..`).
pub fn validate_media_path(path: &str) -> Result<(), CoreError> {
    crate::stream_token::normalize_media_path(path)
        .map(|_| ())
        .ok_or_else(|| CoreError::Validation(format!("Invalid media path '{path}'")))
}

/// A movie's video must sit inside a directory (`movies/42/master.m3u8`),
/// since its streaming token unlocks that whole directory.
pub fn validate_movie_video_path(path: &str) -> Result<(), CoreError> {
    validate_media_path(path)?;
    if crate::stream_token::media_dir(path).is_none() {
        return Err(CoreError::Validation(format!(
            "video_path '{path}' must be inside a directory reserved for this movie"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert!(validate_slug("the-signal-2024").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("The-Signal").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)).is_err());
    }

    #[test]
    fn titles_count_characters_not_bytes() {
        assert!(validate_title("   ").is_err());
        let lao = "ກ".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&lao).is_ok());
    }

    #[test]
    fn runtimes_and_prices() {
        assert!(validate_runtime(None).is_ok());
        assert!(validate_runtime(Some(95)).is_ok());
        assert!(validate_runtime(Some(0)).is_err());
        assert!(validate_price_cents(Some(0)).is_ok());
        assert!(validate_price_cents(Some(-1)).is_err());
    }

    #[test]
    fn currency_codes() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("LAK").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("DOLLAR").is_err());
    }

    #[test]
    fn enumerations() {
        assert!(validate_one_of("status", "draft", movie_status::ALL).is_ok());
        assert!(validate_one_of("status", "live", movie_status::ALL).is_err());
        assert!(validate_one_of("kind", "poster", image_kind::ALL).is_ok());
    }

    #[test]
    fn media_paths() {
        assert!(validate_media_path("movies/1/master.m3u8").is_ok());
        assert!(validate_media_path("../secret").is_err());
        assert!(validate_media_path("/abs/path.mp4").is_err());
    }

    #[test]
    fn movie_videos_need_their_own_directory() {
        assert!(validate_movie_video_path("movies/1/master.m3u8").is_ok());
        assert!(validate_movie_video_path("film.mp4").is_err());
        assert!(validate_movie_video_path("movies/../1/master.m3u8").is_err());
    }
}
