//! Approval workflow routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflows;
use crate::state::AppState;

/// ```text
/// GET    /                             list_workflows
/// POST   /                             create_workflow
/// GET    /{workflow_id}                get_workflow (detail with steps)
/// POST   /{workflow_id}/decisions      submit_decision
/// POST   /{workflow_id}/cancel         cancel_workflow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route("/{workflow_id}", get(workflows::get_workflow))
        .route("/{workflow_id}/decisions", post(workflows::submit_decision))
        .route("/{workflow_id}/cancel", post(workflows::cancel_workflow))
}
