//! Repository for the `vendors` table.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::vendor::{CreateVendor, UpdateVendor, Vendor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, name, category, tier, status, \
    inherent_risk_score, residual_risk_score, contacts, data_processing_locations, \
    last_monitored_at, created_at, updated_at";

/// Provides CRUD operations for vendors.
pub struct VendorRepo;

impl VendorRepo {
    /// Insert a new vendor in `pending_onboarding`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateVendor,
    ) -> Result<Vendor, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendors
                (organization_id, name, category, tier, inherent_risk_score,
                 residual_risk_score, contacts, data_processing_locations)
             VALUES ($1, $2, COALESCE($3, 'other'), $4, COALESCE($5, 50),
                     COALESCE($5, 50), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.tier)
            .bind(input.inherent_risk_score)
            .bind(&input.contacts)
            .bind(&input.data_processing_locations)
            .fetch_one(pool)
            .await
    }

    /// Find a vendor by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendors WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's vendors with optional tier/status filters.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
        tier: Option<&str>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendors
             WHERE organization_id = $1
               AND ($2::TEXT IS NULL OR tier = $2)
               AND ($3::TEXT IS NULL OR status = $3)
             ORDER BY residual_risk_score DESC, name ASC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(organization_id)
            .bind(tier)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update vendor details. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateVendor,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                inherent_risk_score = COALESCE($5, inherent_risk_score),
                contacts = COALESCE($6, contacts),
                data_processing_locations = COALESCE($7, data_processing_locations)
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.inherent_risk_score)
            .bind(&input.contacts)
            .bind(&input.data_processing_locations)
            .fetch_optional(pool)
            .await
    }

    /// Set the vendor status, returning the updated row.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        status: &str,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET status = $3
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Set the vendor tier, returning the updated row.
    pub async fn set_tier(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        tier: &str,
    ) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!(
            "UPDATE vendors SET tier = $3
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vendor>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(tier)
            .fetch_optional(pool)
            .await
    }

    /// Persist a freshly recomputed residual risk score.
    pub async fn set_residual_score(
        pool: &PgPool,
        id: DbId,
        score: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE vendors SET residual_risk_score = $2 WHERE id = $1")
            .bind(id)
            .bind(score)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Vendors due for a monitoring sweep: monitored status and last check
    /// older than their tier's cadence.
    pub async fn list_due_for_monitoring(pool: &PgPool) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendors
             WHERE status IN ('active', 'under_review', 'suspended')
               AND (last_monitored_at IS NULL OR last_monitored_at < NOW() - (
                    CASE tier
                        WHEN 'critical' THEN INTERVAL '1 day'
                        WHEN 'high' THEN INTERVAL '7 days'
                        WHEN 'medium' THEN INTERVAL '30 days'
                        ELSE INTERVAL '90 days'
                    END))
             ORDER BY last_monitored_at ASC NULLS FIRST"
        );
        sqlx::query_as::<_, Vendor>(&query).fetch_all(pool).await
    }

    /// Stamp the last monitoring sweep time.
    pub async fn mark_monitored(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE vendors SET last_monitored_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
