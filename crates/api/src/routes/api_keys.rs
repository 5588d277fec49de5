//! API key routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::api_keys;
use crate::state::AppState;

/// ```text
/// GET    /                     list_api_keys
/// POST   /                     create_api_key
/// DELETE /{key_id}             revoke_api_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/{key_id}", axum::routing::delete(api_keys::revoke_api_key))
}
