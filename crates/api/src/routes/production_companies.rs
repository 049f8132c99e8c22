use axum::routing::get;
use axum::Router;

use crate::handlers::production_companies as companies;
use crate::state::AppState;

/// Production company routes mounted at `/production-companies`.
///
/// ```text
/// GET    /      -> list_companies
/// POST   /      -> create_company (editor)
/// GET    /{id}  -> get_company
/// PUT    /{id}  -> update_company (editor)
/// DELETE /{id}  -> delete_company (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/{id}",
            get(companies::get_company)
                .put(companies::update_company)
                .delete(companies::delete_company),
        )
}
