//! Assessment routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assessments;
use crate::state::AppState;

/// ```text
/// POST   /                            create_assessment
/// GET    /{assessment_id}             get_assessment
/// POST   /{assessment_id}/status      change_status
/// POST   /{assessment_id}/complete    complete_assessment
/// POST   /{assessment_id}/approve     approve_assessment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(assessments::create_assessment))
        .route("/{assessment_id}", get(assessments::get_assessment))
        .route("/{assessment_id}/status", post(assessments::change_status))
        .route(
            "/{assessment_id}/complete",
            post(assessments::complete_assessment),
        )
        .route(
            "/{assessment_id}/approve",
            post(assessments::approve_assessment),
        )
}
