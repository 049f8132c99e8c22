use axum::routing::{get, put};
use axum::Router;

use crate::handlers::genres;
use crate::state::AppState;

/// Genre routes mounted at `/genres`.
///
/// ```text
/// GET    /      -> list_genres
/// POST   /      -> create_genre (editor)
/// PUT    /{id}  -> update_genre (editor)
/// DELETE /{id}  -> delete_genre (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/{id}",
            put(genres::update_genre).delete(genres::delete_genre),
        )
}
