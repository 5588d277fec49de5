//! Issue routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// ```text
/// POST   /                        create_issue
/// GET    /{issue_id}              get_issue
/// POST   /{issue_id}/status       change_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(issues::create_issue))
        .route("/{issue_id}", get(issues::get_issue))
        .route("/{issue_id}/status", post(issues::change_status))
}
