//! Organization (tenant) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full organization row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    /// Globally unique, lowercase, immutable after creation.
    pub subdomain: String,
    pub status: String,
    pub plan: String,
    pub seats: i32,
    pub used_seats: i32,
    pub billing_cycle: Option<String>,
    pub amount: Option<f64>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub sso_enabled: bool,
    pub mfa_required: bool,
    pub session_timeout_mins: i32,
    pub data_residency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new organization (tenant signup).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub subdomain: String,
    pub plan: Option<String>,
    pub seats: Option<i32>,
}

/// DTO for updating organization settings. All fields optional; the
/// subdomain is immutable and deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub plan: Option<String>,
    pub seats: Option<i32>,
    pub billing_cycle: Option<String>,
    pub amount: Option<f64>,
    pub sso_enabled: Option<bool>,
    pub mfa_required: Option<bool>,
    pub session_timeout_mins: Option<i32>,
    pub data_residency: Option<String>,
}
