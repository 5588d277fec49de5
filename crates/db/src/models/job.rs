//! Background job model.

use serde::Serialize;
use sqlx::FromRow;
use veriguard_core::types::{DbId, Timestamp};

/// Job status values for the `jobs.status` column.
pub mod job_status {
    pub const PENDING: &str = "pending";
    pub const RUNNING: &str = "running";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    /// Exhausted every retry attempt.
    pub const DEAD: &str = "dead";
}

/// Known job type values.
pub mod job_type {
    pub const OVERDUE_TASK_SCAN: &str = "overdue_task_scan";
    pub const CONTRACT_EXPIRY_REMINDER: &str = "contract_expiry_reminder";
    pub const VENDOR_MONITORING_SWEEP: &str = "vendor_monitoring_sweep";
    pub const CLEANUP: &str = "cleanup";
    pub const SEND_INVITATION_EMAIL: &str = "send_invitation_email";
}

/// Full job row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub payload: serde_json::Value,
    /// At-least-once delivery; handlers dedup on this key.
    pub dedup_key: Option<String>,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: Timestamp,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
