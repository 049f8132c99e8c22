//! HTTP handlers, one module per resource.

pub mod admin;
pub mod anonymous;
pub mod auth;
pub mod awards;
pub mod credits;
pub mod genres;
pub mod homepage;
pub mod movies;
pub mod packs;
pub mod people;
pub mod production_companies;
pub mod progress;
pub mod rentals;
pub mod stream;
pub mod trailers;

use lao_cinema_core::error::CoreError;
use lao_cinema_core::types::DbId;

use crate::error::AppError;

pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::not_found(entity, id))
}
