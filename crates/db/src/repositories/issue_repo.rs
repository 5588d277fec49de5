//! Repository for the `vendor_issues` table.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::issue::VendorIssue;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, vendor_id, title, description, severity, \
    priority, status, source, category, resolved_at, created_at, updated_at";

/// Statuses that still count against a vendor's residual risk.
const OPEN_STATUSES: &str = "('open', 'in_remediation', 'pending_verification')";

/// Provides CRUD operations for vendor issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a new issue, returning the created row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        vendor_id: DbId,
        title: &str,
        description: Option<&str>,
        severity: &str,
        priority: &str,
        source: &str,
        category: &str,
    ) -> Result<VendorIssue, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendor_issues
                (organization_id, vendor_id, title, description, severity, priority, source, category)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorIssue>(&query)
            .bind(organization_id)
            .bind(vendor_id)
            .bind(title)
            .bind(description)
            .bind(severity)
            .bind(priority)
            .bind(source)
            .bind(category)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<VendorIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_issues WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, VendorIssue>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List a vendor's issues, most severe and newest first.
    pub async fn list_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
        organization_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<VendorIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_issues
             WHERE vendor_id = $1 AND organization_id = $2
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY CASE severity
                    WHEN 'critical' THEN 0
                    WHEN 'high' THEN 1
                    WHEN 'medium' THEN 2
                    ELSE 3
                END,
                created_at DESC"
        );
        sqlx::query_as::<_, VendorIssue>(&query)
            .bind(vendor_id)
            .bind(organization_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Move an issue to a new status (already validated by the caller),
    /// stamping `resolved_at` when it leaves the open set.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        status: &str,
    ) -> Result<Option<VendorIssue>, sqlx::Error> {
        let query = format!(
            "UPDATE vendor_issues SET
                status = $3,
                resolved_at = CASE
                    WHEN $3 IN ('resolved', 'accepted_risk', 'closed') THEN COALESCE(resolved_at, NOW())
                    ELSE NULL
                END
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorIssue>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Severity strings of a vendor's open issues, for residual scoring.
    pub async fn open_severities_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let query = format!(
            "SELECT severity FROM vendor_issues
             WHERE vendor_id = $1 AND status IN {OPEN_STATUSES}"
        );
        sqlx::query_scalar(&query).bind(vendor_id).fetch_all(pool).await
    }
}
