pub mod admin;
pub mod auth;
pub mod awards;
pub mod genres;
pub mod health;
pub mod homepage;
pub mod movies;
pub mod packs;
pub mod people;
pub mod production_companies;
pub mod rentals;
pub mod stream;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /anonymous-id                                    issue signed anonymous id (POST)
///
/// /movies                                          list, create
/// /movies/{id}                                     get, update, delete
/// /movies/{id}/translations/{lang}                 upsert translation (PUT)
/// /movies/{id}/genres                              replace genres (PUT)
/// /movies/{id}/production-companies                replace companies (PUT)
/// /movies/{id}/images                              add image (POST)
/// /movies/{id}/images/{image_id}/primary           make primary (POST)
/// /movies/{id}/images/{image_id}                   delete image
/// /movies/{id}/credits                             cast and crew (GET)
/// /movies/{id}/cast[/{cast_id}]                    add, update, remove cast
/// /movies/{id}/crew[/{crew_id}]                    add, update, remove crew
/// /movies/{id}/trailers[/{trailer_id}]             list, add, delete trailers
/// /movies/{id}/awards                              nominations (GET)
/// /movies/{id}/packs                               packs containing the movie (GET)
/// /movies/{id}/access                              rental access (GET)
/// /movies/{id}/video-token                         mint video token (POST)
/// /movies/{id}/progress                            get, save watch progress
///
/// /people                                          list, create
/// /people/{id}                                     get, update, delete
/// /people/{id}/translations/{lang}                 upsert translation (PUT)
/// /people/{id}/credits                             filmography (GET)
///
/// /genres[/{id}]                                   list, create, update, delete
/// /production-companies[/{id}]                     list, create, get, update, delete
///
/// /packs                                           list, create
/// /packs/{id}                                      get (with items), update, delete
/// /packs/{id}/items[/{movie_id}]                   add, remove item
///
/// /homepage/featured                               get, replace
///
/// /awards                                          list, create shows
/// /awards/{id}                                     show detail, delete
/// /awards/{id}/categories                          add category (POST)
/// /awards/nominations[/{id}]                       add, delete nomination
///
/// /rentals                                         list, create
/// /rentals/migrate                                 anonymous -> user (POST)
///
/// /trailers/{id}/token                             mint trailer token (POST)
/// /stream/{*path}?token=                           media delivery (GET)
///
/// /watch-progress                                  continue watching (GET)
///
/// /admin/users                                     list users (admin)
/// /admin/users/{id}/role                           change role (admin)
/// /admin/audit-logs                                query audit log (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/anonymous-id", post(handlers::anonymous::issue))
        .nest("/movies", movies::router())
        .nest("/people", people::router())
        .nest("/genres", genres::router())
        .nest("/production-companies", production_companies::router())
        .nest("/packs", packs::router())
        .nest("/homepage", homepage::router())
        .nest("/awards", awards::router())
        .nest("/rentals", rentals::router())
        .nest("/trailers", stream::trailer_router())
        .nest("/stream", stream::stream_router())
        .route("/watch-progress", get(handlers::progress::continue_watching))
        .nest("/admin", admin::router())
}
