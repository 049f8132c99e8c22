//! Domain errors. The API layer maps each variant to a status and code.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate slug, email or active rental.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requester has no playable rental for the movie.
    #[error("Rental required: {0}")]
    RentalRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        assert_eq!(
            CoreError::not_found("Movie", 42).to_string(),
            "Movie with id 42 not found"
        );
    }
}
