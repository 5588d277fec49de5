//! Reporting routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// ```text
/// GET    /dashboard            executive summary
/// GET    /heatmap              tier x residual band grid
/// GET    /scorecards           per-vendor scorecards
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(reports::dashboard))
        .route("/heatmap", get(reports::heatmap))
        .route("/scorecards", get(reports::scorecards))
}
