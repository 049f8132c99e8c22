//! Domain logic for the Lao Cinema streaming backend.
//!
//! Everything in this crate is free of database and HTTP concerns so it can be
//! unit tested in isolation and shared by the repository and API layers.

pub mod anonymous_id;
pub mod audit;
pub mod error;
pub mod locale;
pub mod pagination;
pub mod progress;
pub mod rate_limit;
pub mod rental;
pub mod roles;
pub mod stream_token;
pub mod token;
pub mod types;
pub mod validation;
