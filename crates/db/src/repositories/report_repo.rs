//! Read-only aggregation queries for the reporting endpoints.
//!
//! Everything here is a plain GROUP BY over the operational tables,
//! computed per request; nothing is materialized or cached.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::report::{CountBucket, DashboardSummary, HeatmapCell, VendorScorecard};

/// Provides aggregation queries for dashboards, heatmaps, and scorecards.
pub struct ReportRepo;

impl ReportRepo {
    /// Executive dashboard counters for one organization.
    pub async fn dashboard_summary(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<DashboardSummary, sqlx::Error> {
        let vendors_by_status = sqlx::query_as::<_, CountBucket>(
            "SELECT status AS label, COUNT(*) AS count FROM vendors
             WHERE organization_id = $1 GROUP BY status ORDER BY count DESC",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await?;

        let vendors_by_tier = sqlx::query_as::<_, CountBucket>(
            "SELECT tier AS label, COUNT(*) AS count FROM vendors
             WHERE organization_id = $1 GROUP BY tier ORDER BY count DESC",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await?;

        let open_issues_by_severity = sqlx::query_as::<_, CountBucket>(
            "SELECT severity AS label, COUNT(*) AS count FROM vendor_issues
             WHERE organization_id = $1
               AND status IN ('open', 'in_remediation', 'pending_verification')
             GROUP BY severity ORDER BY count DESC",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await?;

        let workflows_in_progress: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM approval_workflows
             WHERE organization_id = $1 AND status = 'in_progress'",
        )
        .bind(organization_id)
        .fetch_one(pool)
        .await?;

        let overdue_tasks: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks
             WHERE organization_id = $1
               AND status NOT IN ('completed', 'cancelled')
               AND due_date IS NOT NULL AND due_date < NOW()",
        )
        .bind(organization_id)
        .fetch_one(pool)
        .await?;

        let actionable_signals: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM monitoring_signals
             WHERE organization_id = $1 AND requires_action AND resolved_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(pool)
        .await?;

        Ok(DashboardSummary {
            vendors_by_status,
            vendors_by_tier,
            open_issues_by_severity,
            workflows_in_progress,
            overdue_tasks,
            actionable_signals,
        })
    }

    /// Vendor risk heatmap: tier x residual band counts.
    ///
    /// Band edges match `veriguard_core::scoring::residual_band`.
    pub async fn risk_heatmap(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<HeatmapCell>, sqlx::Error> {
        sqlx::query_as::<_, HeatmapCell>(
            "SELECT tier,
                    CASE
                        WHEN residual_risk_score >= 75 THEN 'critical'
                        WHEN residual_risk_score >= 50 THEN 'high'
                        WHEN residual_risk_score >= 25 THEN 'medium'
                        ELSE 'low'
                    END AS band,
                    COUNT(*) AS count
             FROM vendors
             WHERE organization_id = $1
             GROUP BY tier, band
             ORDER BY tier, band",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    /// Scorecards for every vendor in the organization.
    pub async fn vendor_scorecards(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<VendorScorecard>, sqlx::Error> {
        sqlx::query_as::<_, VendorScorecard>(
            "SELECT v.id AS vendor_id,
                    v.name,
                    v.tier,
                    v.status,
                    v.inherent_risk_score,
                    v.residual_risk_score,
                    (SELECT COUNT(*) FROM vendor_issues i
                      WHERE i.vendor_id = v.id
                        AND i.status IN ('open', 'in_remediation', 'pending_verification')
                    ) AS open_issues,
                    (SELECT COUNT(*) FROM vendor_assessments a
                      WHERE a.vendor_id = v.id AND a.status IN ('completed', 'approved')
                    ) AS completed_assessments,
                    (SELECT COUNT(*) FROM monitoring_signals s
                      WHERE s.vendor_id = v.id AND s.detected_at > NOW() - INTERVAL '90 days'
                    ) AS signals_last_90_days,
                    (SELECT MAX(a.completed_at) FROM vendor_assessments a
                      WHERE a.vendor_id = v.id
                    ) AS last_assessment_at
             FROM vendors v
             WHERE v.organization_id = $1
             ORDER BY v.residual_risk_score DESC",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }
}
