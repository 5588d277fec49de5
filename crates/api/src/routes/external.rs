//! External integration routes (API-key authenticated).

use axum::routing::post;
use axum::Router;

use crate::handlers::external;
use crate::state::AppState;

/// ```text
/// POST   /monitoring/signals   record_signal (X-Api-Key)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/monitoring/signals", post(external::record_signal))
}
