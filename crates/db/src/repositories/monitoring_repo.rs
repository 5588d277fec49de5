//! Repository for the `monitoring_signals` table.
//!
//! Signals are immutable after insert apart from acknowledgment and
//! resolution timestamps.

use sqlx::PgPool;
use veriguard_core::types::{DbId, Timestamp};

use crate::models::monitoring::MonitoringSignal;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, vendor_id, monitoring_type, risk_level, \
    risk_description, current_value, previous_value, change_detected, requires_action, \
    detected_at, acknowledged_at, resolved_at, created_at";

/// Provides operations for monitoring signals.
pub struct MonitoringRepo;

impl MonitoringRepo {
    /// Insert a new signal, returning the created row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        vendor_id: DbId,
        monitoring_type: &str,
        risk_level: &str,
        risk_description: &str,
        current_value: &str,
        previous_value: Option<&str>,
        change_detected: bool,
        requires_action: bool,
        detected_at: Timestamp,
    ) -> Result<MonitoringSignal, sqlx::Error> {
        let query = format!(
            "INSERT INTO monitoring_signals
                (organization_id, vendor_id, monitoring_type, risk_level, risk_description,
                 current_value, previous_value, change_detected, requires_action, detected_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(organization_id)
            .bind(vendor_id)
            .bind(monitoring_type)
            .bind(risk_level)
            .bind(risk_description)
            .bind(current_value)
            .bind(previous_value)
            .bind(change_detected)
            .bind(requires_action)
            .bind(detected_at)
            .fetch_one(pool)
            .await
    }

    /// Find a signal by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<MonitoringSignal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM monitoring_signals WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List a vendor's signals, most recently detected first.
    pub async fn list_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
        organization_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MonitoringSignal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM monitoring_signals
             WHERE vendor_id = $1 AND organization_id = $2
             ORDER BY detected_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(vendor_id)
            .bind(organization_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List signals requiring action that are not yet resolved.
    pub async fn list_actionable(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<MonitoringSignal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM monitoring_signals
             WHERE organization_id = $1 AND requires_action AND resolved_at IS NULL
             ORDER BY detected_at DESC"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Acknowledge a signal. Returns the updated row.
    pub async fn acknowledge(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<MonitoringSignal>, sqlx::Error> {
        let query = format!(
            "UPDATE monitoring_signals SET acknowledged_at = COALESCE(acknowledged_at, NOW())
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a signal. Returns the updated row.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<MonitoringSignal>, sqlx::Error> {
        let query = format!(
            "UPDATE monitoring_signals SET resolved_at = COALESCE(resolved_at, NOW())
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonitoringSignal>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }
}
