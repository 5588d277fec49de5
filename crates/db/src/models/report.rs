//! Read-only aggregation row types for reporting endpoints.

use serde::Serialize;
use sqlx::FromRow;
use veriguard_core::types::{DbId, Timestamp};

/// One `(group, count)` bucket from a GROUP BY query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CountBucket {
    pub label: String,
    pub count: i64,
}

/// Executive dashboard summary for one organization.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub vendors_by_status: Vec<CountBucket>,
    pub vendors_by_tier: Vec<CountBucket>,
    pub open_issues_by_severity: Vec<CountBucket>,
    pub workflows_in_progress: i64,
    pub overdue_tasks: i64,
    pub actionable_signals: i64,
}

/// One cell of the vendor risk heatmap: tier x residual band.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HeatmapCell {
    pub tier: String,
    pub band: String,
    pub count: i64,
}

/// Per-vendor scorecard: lifecycle, risk posture, and activity counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorScorecard {
    pub vendor_id: DbId,
    pub name: String,
    pub tier: String,
    pub status: String,
    pub inherent_risk_score: f64,
    pub residual_risk_score: f64,
    pub open_issues: i64,
    pub completed_assessments: i64,
    pub signals_last_90_days: i64,
    pub last_assessment_at: Option<Timestamp>,
}
