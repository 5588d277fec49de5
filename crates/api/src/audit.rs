//! Audit trail recording for mutating handlers.
//!
//! Every mutating operation records an audit row; failed mutations are
//! recorded with status `failure` *before* the error is surfaced to the
//! caller. [`finish`] wraps a handler's already-computed result so the two
//! paths cannot diverge.

use serde_json::json;
use veriguard_core::audit::{redact_sensitive_fields, AuditStatus};
use veriguard_core::types::DbId;
use veriguard_db::models::audit::RecordAudit;
use veriguard_db::repositories::AuditRepo;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Record the outcome of a mutating operation and pass the result through.
///
/// On `Ok`, records a success row (resource id taken from the value); on
/// `Err`, records a failure row carrying the error text, then returns the
/// error unchanged. Audit writes never mask the operation outcome: a failed
/// audit insert is logged and swallowed.
pub async fn finish<T>(
    state: &AppState,
    auth: Option<&AuthUser>,
    action: &str,
    resource_type: &str,
    details: serde_json::Value,
    result: Result<T, AppError>,
    resource_id_of: impl FnOnce(&T) -> Option<DbId>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            let resource_id = resource_id_of(&value);
            record(
                state,
                auth,
                action,
                resource_type,
                resource_id,
                AuditStatus::Success,
                details,
            )
            .await;
            Ok(value)
        }
        Err(err) => {
            let details = json!({
                "input": details,
                "error": err.to_string(),
            });
            record(
                state,
                auth,
                action,
                resource_type,
                None,
                AuditStatus::Failure,
                details,
            )
            .await;
            Err(err)
        }
    }
}

/// Append one audit row, redacting sensitive detail fields first.
pub async fn record(
    state: &AppState,
    auth: Option<&AuthUser>,
    action: &str,
    resource_type: &str,
    resource_id: Option<DbId>,
    status: AuditStatus,
    details: serde_json::Value,
) {
    let entry = RecordAudit {
        organization_id: auth.map(|a| a.organization_id),
        user_id: auth.map(|a| a.user_id),
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id,
        status: status.as_str().to_string(),
        details: redact_sensitive_fields(&details),
    };

    if let Err(e) = AuditRepo::record(&state.pool, &entry).await {
        tracing::error!(
            error = %e,
            action,
            resource_type,
            "Failed to write audit entry"
        );
    }
}
