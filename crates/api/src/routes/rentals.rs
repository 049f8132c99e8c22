use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rentals;
use crate::state::AppState;

/// Rental routes mounted at `/rentals`.
///
/// ```text
/// GET  /         -> list_rentals (renter)
/// POST /         -> create_rental (renter)
/// POST /migrate  -> migrate (auth + X-Anonymous-Id)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rentals::list_rentals).post(rentals::create_rental))
        .route("/migrate", post(rentals::migrate))
}
