//! Route definitions for award shows.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::awards;
use crate::state::AppState;

/// Award routes mounted at `/awards`.
///
/// ```text
/// GET    /                    -> list_shows
/// POST   /                    -> create_show (editor)
/// GET    /{id}                -> get_show (categories + nominations)
/// DELETE /{id}                -> delete_show (editor)
/// POST   /{id}/categories     -> create_category (editor)
/// POST   /nominations         -> create_nomination (editor)
/// DELETE /nominations/{id}    -> delete_nomination (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(awards::list_shows).post(awards::create_show))
        .route("/nominations", post(awards::create_nomination))
        .route("/nominations/{id}", delete(awards::delete_nomination))
        .route(
            "/{id}",
            get(awards::get_show).delete(awards::delete_show),
        )
        .route("/{id}/categories", post(awards::create_category))
}
