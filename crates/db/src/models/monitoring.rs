//! Continuous monitoring signal model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veriguard_core::monitoring::Observation;
use veriguard_core::types::{DbId, Timestamp};

/// Full signal row from the `monitoring_signals` table.
///
/// Immutable once created, apart from the acknowledgment and resolution
/// timestamps.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonitoringSignal {
    pub id: DbId,
    pub organization_id: DbId,
    pub vendor_id: DbId,
    pub monitoring_type: String,
    /// Derived, never caller-supplied.
    pub risk_level: String,
    pub risk_description: String,
    pub current_value: String,
    pub previous_value: Option<String>,
    pub change_detected: bool,
    pub requires_action: bool,
    pub detected_at: Timestamp,
    pub acknowledged_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for recording a monitoring signal.
///
/// The observation carries the type-specific raw inputs; the risk level is
/// derived server-side and rejected if supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSignal {
    pub vendor_id: DbId,
    #[serde(flatten)]
    pub observation: Observation,
    pub risk_description: String,
    pub current_value: String,
    pub previous_value: Option<String>,
    pub detected_at: Option<Timestamp>,
}

/// Everything the monitoring pipeline produced for one recorded signal.
#[derive(Debug, Clone, Serialize)]
pub struct SignalOutcome {
    pub signal: MonitoringSignal,
    /// Issue id, when the signal was Critical.
    pub issue_id: Option<DbId>,
    /// Triggered reassessment id, when a change above Low was detected and
    /// no triggered reassessment was already open for the vendor.
    pub reassessment_id: Option<DbId>,
}
