//! Vendor routes, including vendor-scoped subresource listings.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{assessments, contracts, issues, monitoring, vendors};
use crate::state::AppState;

/// ```text
/// GET    /                             list_vendors
/// POST   /                             create_vendor
/// GET    /{vendor_id}                  get_vendor
/// PATCH  /{vendor_id}                  update_vendor
/// POST   /{vendor_id}/status           change_status
/// POST   /{vendor_id}/tier             change_tier
/// GET    /{vendor_id}/assessments      assessment history
/// GET    /{vendor_id}/issues           issue list
/// GET    /{vendor_id}/signals          signal history
/// GET    /{vendor_id}/contracts        contract list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::list_vendors).post(vendors::create_vendor))
        .route(
            "/{vendor_id}",
            get(vendors::get_vendor).patch(vendors::update_vendor),
        )
        .route("/{vendor_id}/status", post(vendors::change_status))
        .route("/{vendor_id}/tier", post(vendors::change_tier))
        .route("/{vendor_id}/assessments", get(assessments::list_for_vendor))
        .route("/{vendor_id}/issues", get(issues::list_for_vendor))
        .route("/{vendor_id}/signals", get(monitoring::list_for_vendor))
        .route("/{vendor_id}/contracts", get(contracts::list_for_vendor))
}
