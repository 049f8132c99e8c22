//! Request extractors for identity, authorization and rate limiting.
//!
//! - [`auth::AuthUser`]: a user authenticated by a Bearer JWT.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireEditor`]: role gates.
//! - [`viewer::Viewer`]: optional user and/or anonymous visitor identity.
//! - [`rate_limit::enforce`]: per-identity budget for token minting.

pub mod auth;
pub mod rate_limit;
pub mod rbac;
pub mod viewer;
