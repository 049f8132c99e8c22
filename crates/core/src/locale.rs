//! Supported content languages and translation fallback.
//!
//! Every translatable entity stores at most one translation per language.
//! Display text falls back from the requested language to English, then Lao.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Lo,
    En,
}

/// Fallback order after the requested language.
pub const FALLBACK_ORDER: [Language; 2] = [Language::En, Language::Lo];

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Lo => "lo",
            Language::En => "en",
        }
    }

    /// Parse a two-letter code (case-insensitive, region subtags ignored).
    pub fn parse(code: &str) -> Result<Self, CoreError> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "lo" => Ok(Language::Lo),
            "en" => Ok(Language::En),
            _ => Err(CoreError::Validation(format!(
                "Unsupported language '{code}'. Expected 'lo' or 'en'"
            ))),
        }
    }

    /// Pick the first supported language from an `Accept-Language` header,
    /// honouring `q` weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Language)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim();
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Language::parse(tag).ok().map(|lang| (quality, lang))
            })
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, lang)| *lang)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Anything keyed by a language code.
pub trait Localized {
    fn language(&self) -> &str;
}

/// Pick the best translation for `preferred`, falling back through
/// [`FALLBACK_ORDER`], then to whatever exists.
pub fn pick<T: Localized>(items: &[T], preferred: Language) -> Option<&T> {
    std::iter::once(preferred)
        .chain(FALLBACK_ORDER)
        .find_map(|lang| items.iter().find(|t| t.language() == lang.code()))
        .or_else(|| items.first())
}
