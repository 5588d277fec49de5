//! Contract routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contracts;
use crate::state::AppState;

/// ```text
/// POST   /                        create_contract
/// GET    /{contract_id}           get_contract
/// PATCH  /{contract_id}           update_contract
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(contracts::create_contract))
        .route(
            "/{contract_id}",
            get(contracts::get_contract).patch(contracts::update_contract),
        )
}
