//! Handlers for read-only reporting: executive dashboard, risk heatmap,
//! and vendor scorecards.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use veriguard_core::permissions::Permission;
use veriguard_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reports/dashboard
pub async fn dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ReportView, org_id).await?;

    let summary = ReportRepo::dashboard_summary(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /api/v1/reports/heatmap
pub async fn heatmap(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ReportView, org_id).await?;

    let cells = ReportRepo::risk_heatmap(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: cells }))
}

/// GET /api/v1/reports/scorecards
pub async fn scorecards(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ReportView, org_id).await?;

    let cards = ReportRepo::vendor_scorecards(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: cards }))
}
