//! Handler for querying the audit trail.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use veriguard_core::permissions::Permission;
use veriguard_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::AuditListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit
///
/// Tenant-scoped audit entries, newest first.
pub async fn list_audit_entries(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AuditListParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AuditView, org_id).await?;

    let entries = AuditRepo::list_for_org(
        &state.pool,
        org_id,
        params.resource_type.as_deref(),
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: entries }))
}
