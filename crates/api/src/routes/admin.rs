use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin`.
///
/// ```text
/// GET /users            -> list_users (admin)
/// PUT /users/{id}/role  -> update_role (admin)
/// GET /audit-logs       -> list_audit_logs (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::update_role))
        .route("/audit-logs", get(admin::list_audit_logs))
}
