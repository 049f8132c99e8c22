use axum::routing::get;
use axum::Router;

use crate::handlers::homepage;
use crate::state::AppState;

/// Homepage routes mounted at `/homepage`.
///
/// ```text
/// GET /featured  -> get_featured
/// PUT /featured  -> set_featured (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/featured",
        get(homepage::get_featured).put(homepage::set_featured),
    )
}
