//! Repository for the `audit_log` table.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::audit::{AuditEntry, RecordAudit};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, user_id, action, resource_type, resource_id, \
    status, details, created_at";

/// Provides append and query operations for the audit trail.
pub struct AuditRepo;

impl AuditRepo {
    /// Append an audit entry.
    ///
    /// Details must already be redacted (see
    /// `veriguard_core::audit::redact_sensitive_fields`).
    pub async fn record(pool: &PgPool, entry: &RecordAudit) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log
                (organization_id, user_id, action, resource_type, resource_id, status, details)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(entry.organization_id)
            .bind(entry.user_id)
            .bind(&entry.action)
            .bind(&entry.resource_type)
            .bind(entry.resource_id)
            .bind(&entry.status)
            .bind(&entry.details)
            .fetch_one(pool)
            .await
    }

    /// List an organization's audit entries, newest first.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
        resource_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_log
             WHERE organization_id = $1
               AND ($2::TEXT IS NULL OR resource_type = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(organization_id)
            .bind(resource_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
