//! External integration surface, authenticated by API key.
//!
//! Monitoring connectors push signals here with an `X-Api-Key` header
//! instead of a user JWT. The key's organization scopes the operation and
//! the `monitoring:write` scope is required.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use veriguard_core::audit::{actions, AuditStatus};
use veriguard_db::models::monitoring::RecordSignal;

use crate::audit;
use crate::error::AppResult;
use crate::handlers::monitoring::apply_signal;
use crate::middleware::api_key::ApiKeyAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Scope required to push monitoring signals.
pub const SCOPE_MONITORING_WRITE: &str = "monitoring:write";

/// POST /api/v1/external/monitoring/signals
pub async fn record_signal(
    key: ApiKeyAuth,
    State(state): State<AppState>,
    Json(input): Json<RecordSignal>,
) -> AppResult<impl IntoResponse> {
    key.require_scope(SCOPE_MONITORING_WRITE)?;

    let result = apply_signal(&state, key.organization_id, None, &input).await;

    // API-key mutations audit under the key's organization with no user.
    let status = if result.is_ok() {
        AuditStatus::Success
    } else {
        AuditStatus::Failure
    };
    audit::record(
        &state,
        None,
        actions::RECORD_SIGNAL,
        "monitoring_signal",
        result.as_ref().ok().and_then(|o| o.as_ref().map(|o| o.signal.id)),
        status,
        json!({
            "api_key_id": key.key_id,
            "organization_id": key.organization_id,
            "vendor_id": input.vendor_id,
        }),
    )
    .await;

    let outcome = result?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}
