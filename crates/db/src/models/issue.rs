//! Vendor issue (finding) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full issue row from the `vendor_issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VendorIssue {
    pub id: DbId,
    pub organization_id: DbId,
    pub vendor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub severity: String,
    pub priority: String,
    pub status: String,
    pub source: String,
    pub category: String,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for raising an issue (manual or from monitoring).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateIssue {
    pub vendor_id: DbId,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub description: Option<String>,
    pub severity: String,
    pub priority: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for an issue status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeIssueStatus {
    pub status: String,
}
