//! Route definitions for short-film packs.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::packs;
use crate::state::AppState;

/// Pack routes mounted at `/packs`.
///
/// ```text
/// GET    /                        -> list_packs
/// POST   /                        -> create_pack (editor)
/// GET    /{id}                    -> get_pack
/// PUT    /{id}                    -> update_pack (editor)
/// DELETE /{id}                    -> delete_pack (editor)
/// POST   /{id}/items              -> add_item (editor)
/// DELETE /{id}/items/{movie_id}   -> remove_item (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(packs::list_packs).post(packs::create_pack))
        .route(
            "/{id}",
            get(packs::get_pack)
                .put(packs::update_pack)
                .delete(packs::delete_pack),
        )
        .route("/{id}/items", post(packs::add_item))
        .route("/{id}/items/{movie_id}", delete(packs::remove_item))
}
