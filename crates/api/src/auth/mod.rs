//! Account credentials and access tokens.
//!
//! - [`password`]: Argon2id password hashing and verification.
//! - [`jwt`]: JWT access tokens and hashed refresh tokens.

pub mod jwt;
pub mod password;
