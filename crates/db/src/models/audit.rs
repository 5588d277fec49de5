//! Audit trail model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use veriguard_core::types::{DbId, Timestamp};

/// Full audit row from the `audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub organization_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<DbId>,
    /// `success` or `failure`.
    pub status: String,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// Insert payload for an audit entry. Details are redacted before this
/// struct is built (see `veriguard_core::audit::redact_sensitive_fields`).
#[derive(Debug, Clone)]
pub struct RecordAudit {
    pub organization_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<DbId>,
    pub status: String,
    pub details: serde_json::Value,
}
