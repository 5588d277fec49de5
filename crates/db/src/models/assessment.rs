//! Vendor assessment model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veriguard_core::types::{DbId, Timestamp};

/// Full assessment row from the `vendor_assessments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorAssessment {
    pub id: DbId,
    pub organization_id: DbId,
    pub vendor_id: DbId,
    /// Parseable as `veriguard_core::assessment::AssessmentType`.
    pub assessment_type: String,
    /// Parseable as `veriguard_core::assessment::AssessmentStatus`.
    pub status: String,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub overall_score: Option<f64>,
    pub recommendations: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an assessment cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssessment {
    pub vendor_id: DbId,
    pub assessment_type: String,
    pub due_date: Option<Timestamp>,
}

/// Request body for an assessment status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeAssessmentStatus {
    pub status: String,
}

/// Request body for completing an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAssessment {
    pub overall_score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
