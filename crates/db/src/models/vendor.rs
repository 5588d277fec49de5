//! Vendor model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full vendor row from the `vendors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vendor {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub category: String,
    /// Parseable as `veriguard_core::vendor::VendorTier`.
    pub tier: String,
    /// Parseable as `veriguard_core::vendor::VendorStatus`.
    pub status: String,
    pub inherent_risk_score: f64,
    pub residual_risk_score: f64,
    /// Array of `{ "name": ..., "email": ..., "role": ... }` objects.
    pub contacts: serde_json::Value,
    pub data_processing_locations: Vec<String>,
    pub last_monitored_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for onboarding a new vendor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVendor {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: Option<String>,
    pub tier: String,
    pub inherent_risk_score: Option<f64>,
    #[serde(default)]
    pub contacts: serde_json::Value,
    #[serde(default)]
    pub data_processing_locations: Vec<String>,
}

/// DTO for updating vendor details. Tier and status changes go through
/// their dedicated endpoints so they can be validated and audited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVendor {
    pub name: Option<String>,
    pub category: Option<String>,
    pub inherent_risk_score: Option<f64>,
    pub contacts: Option<serde_json::Value>,
    pub data_processing_locations: Option<Vec<String>>,
}

/// Request body for a vendor status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeVendorStatus {
    pub status: String,
}

/// Request body for a vendor tier change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeVendorTier {
    pub tier: String,
}
