//! Continuous monitoring routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::monitoring;
use crate::state::AppState;

/// ```text
/// POST   /signals                          record_signal
/// GET    /actionable                       list_actionable
/// POST   /signals/{signal_id}/acknowledge  acknowledge
/// POST   /signals/{signal_id}/resolve      resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signals", post(monitoring::record_signal))
        .route("/actionable", get(monitoring::list_actionable))
        .route(
            "/signals/{signal_id}/acknowledge",
            post(monitoring::acknowledge),
        )
        .route("/signals/{signal_id}/resolve", post(monitoring::resolve))
}
