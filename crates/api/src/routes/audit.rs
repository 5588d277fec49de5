//! Audit trail routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit_trail;
use crate::state::AppState;

/// ```text
/// GET    /                     list_audit_entries
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit_trail::list_audit_entries))
}
