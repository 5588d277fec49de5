//! Organization routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::organizations;
use crate::state::AppState;

/// ```text
/// POST   /                      signup (public)
/// GET    /{org_id}              get_organization
/// PATCH  /{org_id}              update_organization
/// POST   /{org_id}/status       change_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(organizations::signup))
        .route(
            "/{org_id}",
            get(organizations::get_organization).patch(organizations::update_organization),
        )
        .route("/{org_id}/status", post(organizations::change_status))
}
