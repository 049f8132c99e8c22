//! Route definitions for movies and everything nested under a movie.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{credits, movies, packs, progress, rentals, stream, trailers};
use crate::state::AppState;

/// Movie routes mounted at `/movies`.
///
/// ```text
/// GET    /                                 -> list_movies
/// POST   /                                 -> create_movie (editor)
/// GET    /{id}                             -> get_movie
/// PUT    /{id}                             -> update_movie (editor)
/// DELETE /{id}                             -> delete_movie (editor)
/// PUT    /{id}/translations/{lang}         -> upsert_translation (editor)
/// PUT    /{id}/genres                      -> set_genres (editor)
/// PUT    /{id}/production-companies        -> set_production_companies (editor)
/// POST   /{id}/images                      -> add_image (editor)
/// POST   /{id}/images/{image_id}/primary   -> set_primary_image (editor)
/// DELETE /{id}/images/{image_id}           -> delete_image (editor)
/// GET    /{id}/credits                     -> list_credits
/// POST   /{id}/cast                        -> add_cast (editor)
/// PUT    /{id}/cast/{cast_id}              -> update_cast (editor)
/// DELETE /{id}/cast/{cast_id}              -> remove_cast (editor)
/// POST   /{id}/crew                        -> add_crew (editor)
/// PUT    /{id}/crew/{crew_id}              -> update_crew (editor)
/// DELETE /{id}/crew/{crew_id}              -> remove_crew (editor)
/// GET    /{id}/trailers                    -> list_trailers
/// POST   /{id}/trailers                    -> add_trailer (editor)
/// DELETE /{id}/trailers/{trailer_id}       -> delete_trailer (editor)
/// GET    /{id}/awards                      -> movie_awards
/// GET    /{id}/packs                       -> packs_for_movie
/// GET    /{id}/access                      -> movie_access
/// POST   /{id}/video-token                 -> video_token (rate limited)
/// GET    /{id}/progress                    -> get_progress
/// PUT    /{id}/progress                    -> update_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(movies::list_movies).post(movies::create_movie))
        .route(
            "/{id}",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route("/{id}/translations/{lang}", put(movies::upsert_translation))
        .route("/{id}/genres", put(movies::set_genres))
        .route(
            "/{id}/production-companies",
            put(movies::set_production_companies),
        )
        .route("/{id}/images", post(movies::add_image))
        .route(
            "/{id}/images/{image_id}/primary",
            post(movies::set_primary_image),
        )
        .route(
            "/{id}/images/{image_id}",
            delete(movies::delete_image),
        )
        .route("/{id}/credits", get(credits::list_credits))
        .route("/{id}/cast", post(credits::add_cast))
        .route(
            "/{id}/cast/{cast_id}",
            put(credits::update_cast).delete(credits::remove_cast),
        )
        .route("/{id}/crew", post(credits::add_crew))
        .route(
            "/{id}/crew/{crew_id}",
            put(credits::update_crew).delete(credits::remove_crew),
        )
        .route(
            "/{id}/trailers",
            get(trailers::list_trailers).post(trailers::add_trailer),
        )
        .route(
            "/{id}/trailers/{trailer_id}",
            delete(trailers::delete_trailer),
        )
        .route("/{id}/awards", get(movies::movie_awards))
        .route("/{id}/packs", get(packs::packs_for_movie))
        .route("/{id}/access", get(rentals::movie_access))
        .route("/{id}/video-token", post(stream::video_token))
        .route(
            "/{id}/progress",
            get(progress::get_progress).put(progress::update_progress),
        )
}
