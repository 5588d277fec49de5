//! Repository for the `contracts` table.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::contract::{Contract, CreateContract, UpdateContract};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, vendor_id, name, value, start_date, end_date, \
    auto_renews, status, expiry_reminder_sent_at, created_at, updated_at";

/// Provides CRUD operations for vendor contracts.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a new contract, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateContract,
    ) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (organization_id, vendor_id, name, value, start_date, end_date, auto_renews)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(organization_id)
            .bind(input.vendor_id)
            .bind(&input.name)
            .bind(input.value)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.auto_renews)
            .fetch_one(pool)
            .await
    }

    /// Find a contract by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List a vendor's contracts, soonest ending first.
    pub async fn list_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
        organization_id: DbId,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts
             WHERE vendor_id = $1 AND organization_id = $2
             ORDER BY end_date ASC"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(vendor_id)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Update a contract. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateContract,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                name = COALESCE($3, name),
                value = COALESCE($4, value),
                end_date = COALESCE($5, end_date),
                auto_renews = COALESCE($6, auto_renews),
                status = COALESCE($7, status)
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(input.value)
            .bind(input.end_date)
            .bind(input.auto_renews)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Active contracts ending within `days` that have not had a reminder.
    ///
    /// Used by the daily contract-expiry scan.
    pub async fn expiring_within(
        pool: &PgPool,
        days: i64,
    ) -> Result<Vec<Contract>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contracts
             WHERE status = 'active'
               AND expiry_reminder_sent_at IS NULL
               AND end_date <= NOW() + ($1 * INTERVAL '1 day')
             ORDER BY end_date ASC"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(days)
            .fetch_all(pool)
            .await
    }

    /// Stamp a contract's expiry reminder as sent (idempotent).
    pub async fn mark_reminder_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE contracts SET expiry_reminder_sent_at = COALESCE(expiry_reminder_sent_at, NOW())
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
