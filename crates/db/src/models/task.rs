//! Task model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<DbId>,
    pub assigned_by: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub priority: String,
    pub status: String,
    pub related_vendor_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub priority: Option<String>,
    pub related_vendor_id: Option<DbId>,
}

/// DTO for updating a task. All fields are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub priority: Option<String>,
    pub status: Option<String>,
}
