//! Vendor contract model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full contract row from the `contracts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub organization_id: DbId,
    pub vendor_id: DbId,
    pub name: String,
    pub value: Option<f64>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub auto_renews: bool,
    pub status: String,
    pub expiry_reminder_sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contract.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateContract {
    pub vendor_id: DbId,
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    pub value: Option<f64>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[serde(default)]
    pub auto_renews: bool,
}

/// DTO for updating a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContract {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub end_date: Option<Timestamp>,
    pub auto_renews: Option<bool>,
    pub status: Option<String>,
}
