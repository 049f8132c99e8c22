//! Route definitions for people.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::people;
use crate::state::AppState;

/// People routes mounted at `/people`.
///
/// ```text
/// GET    /                          -> list_people
/// POST   /                          -> create_person (editor)
/// GET    /{id}                      -> get_person
/// PUT    /{id}                      -> update_person (editor)
/// DELETE /{id}                      -> delete_person (editor)
/// PUT    /{id}/translations/{lang}  -> upsert_translation (editor)
/// GET    /{id}/credits              -> person_credits
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(people::list_people).post(people::create_person))
        .route(
            "/{id}",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
        .route("/{id}/translations/{lang}", put(people::upsert_translation))
        .route("/{id}/credits", get(people::person_credits))
}
