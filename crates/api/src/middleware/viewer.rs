//! Identity of whoever is watching: a signed-in user, an anonymous visitor
//! holding a signed id, both, or neither.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use lao_cinema_core::anonymous_id;
use lao_cinema_core::error::CoreError;
use lao_cinema_core::rental::Renter;
use lao_cinema_core::roles::can_edit_content;
use lao_cinema_core::token::TokenError;
use lao_cinema_core::types::DbId;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying a signed anonymous-id token.
pub const ANONYMOUS_ID_HEADER: &str = "x-anonymous-id";

#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: Option<AuthUser>,
    /// Verified anonymous id (UUID), when the header was sent.
    pub anonymous_id: Option<String>,
    pub client_ip: Option<String>,
}

impl Viewer {
    /// The identity that owns rentals and progress. A signed-in user takes
    /// precedence over an anonymous id sent alongside it.
    pub fn renter(&self) -> Option<Renter> {
        match (&self.user, &self.anonymous_id) {
            (Some(user), _) => Some(Renter::User(user.user_id)),
            (None, Some(aid)) => Some(Renter::Anonymous(aid.clone())),
            (None, None) => None,
        }
    }

    /// Like [`Viewer::renter`], but a guest is rejected with 401.
    pub fn require_renter(&self) -> AppResult<Renter> {
        self.renter().ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Sign in or send an X-Anonymous-Id token".into(),
            ))
        })
    }

    pub fn user_id(&self) -> Option<DbId> {
        self.user.as_ref().map(|u| u.user_id)
    }

    /// Whether the viewer may see unpublished catalogue entries.
    pub fn can_edit(&self) -> bool {
        self.user.as_ref().is_some_and(|u| can_edit_content(&u.role))
    }

    /// Rate-limit key: the renter when known, otherwise the client address.
    pub fn rate_limit_key(&self) -> String {
        match self.renter() {
            Some(renter) => renter.rate_limit_key(),
            None => format!("ip:{}", self.client_ip.as_deref().unwrap_or("unknown")),
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_parts_optional(parts, state)?;

        let anonymous_id = anonymous_id_from_headers(&parts.headers, state)?;

        Ok(Viewer {
            user,
            anonymous_id,
            client_ip: client_ip(&parts.headers),
        })
    }
}

/// Verify the `X-Anonymous-Id` header, if present.
pub fn anonymous_id_from_headers(headers: &HeaderMap, state: &AppState) -> AppResult<Option<String>> {
    let Some(value) = headers.get(ANONYMOUS_ID_HEADER) else {
        return Ok(None);
    };
    let token = value.to_str().map_err(|_| TokenError::Malformed)?;
    let aid = anonymous_id::resolve(&state.anonymous_codec, token.trim(), Utc::now())?;
    Ok(Some(aid))
}

/// Client address from `X-Forwarded-For` or `X-Real-IP`.
///
/// The server is deployed behind one trusted reverse proxy that appends the
/// peer address to `X-Forwarded-For`. Only that right-most hop is used;
/// earlier entries are whatever the client chose to send.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn viewer(user: Option<DbId>, aid: Option<&str>) -> Viewer {
        Viewer {
            user: user.map(|user_id| AuthUser {
                user_id,
                role: "viewer".into(),
            }),
            anonymous_id: aid.map(str::to_string),
            client_ip: Some("203.0.113.9".into()),
        }
    }

    #[test]
    fn user_takes_precedence_over_anonymous_id() {
        assert_eq!(viewer(Some(3), Some("aid")).renter(), Some(Renter::User(3)));
        assert_eq!(
            viewer(None, Some("aid")).renter(),
            Some(Renter::Anonymous("aid".into()))
        );
        assert_eq!(viewer(None, None).renter(), None);
    }

    #[test]
    fn guests_are_limited_by_address() {
        assert_eq!(viewer(None, None).rate_limit_key(), "ip:203.0.113.9");
        assert_eq!(viewer(Some(3), None).rate_limit_key(), "user:3");
        assert!(viewer(None, None).require_renter().is_err());
    }

    #[test]
    fn forwarded_for_uses_proxy_appended_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 198.51.100.4"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));

        // A client rotating a spoofed first hop keeps the same address.
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("5.6.7.8, 198.51.100.4"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers).as_deref(), Some("10.0.0.2"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
