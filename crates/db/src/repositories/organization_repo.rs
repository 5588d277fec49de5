//! Repository for the `organizations` table.
//!
//! Seat accounting uses single-statement guarded updates so concurrent user
//! creation cannot oversubscribe a plan and release never drives the count
//! negative.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::organization::{CreateOrganization, Organization, UpdateOrganization};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, subdomain, status, plan, seats, used_seats, billing_cycle, \
    amount, period_start, period_end, sso_enabled, mfa_required, session_timeout_mins, \
    data_residency, created_at, updated_at";

/// Default seat count for new organizations without an explicit plan size.
const DEFAULT_SEATS: i32 = 5;

/// Provides CRUD and seat accounting for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization, returning the created row.
    ///
    /// `subdomain` must already be normalized (lowercase); a duplicate hits
    /// the `uq_organizations_subdomain` index and surfaces as a conflict.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
        subdomain: &str,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (name, subdomain, plan, seats)
             VALUES ($1, $2, COALESCE($3, 'trial'), COALESCE($4, $5))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .bind(subdomain)
            .bind(&input.plan)
            .bind(input.seats)
            .bind(DEFAULT_SEATS)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an organization by its (normalized) subdomain.
    pub async fn find_by_subdomain(
        pool: &PgPool,
        subdomain: &str,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE subdomain = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(subdomain)
            .fetch_optional(pool)
            .await
    }

    /// Update organization settings. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET
                name = COALESCE($2, name),
                plan = COALESCE($3, plan),
                seats = COALESCE($4, seats),
                billing_cycle = COALESCE($5, billing_cycle),
                amount = COALESCE($6, amount),
                sso_enabled = COALESCE($7, sso_enabled),
                mfa_required = COALESCE($8, mfa_required),
                session_timeout_mins = COALESCE($9, session_timeout_mins),
                data_residency = COALESCE($10, data_residency)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.plan)
            .bind(input.seats)
            .bind(&input.billing_cycle)
            .bind(input.amount)
            .bind(input.sso_enabled)
            .bind(input.mfa_required)
            .bind(input.session_timeout_mins)
            .bind(&input.data_residency)
            .fetch_optional(pool)
            .await
    }

    /// Set the organization status, returning the updated row.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim one seat.
    ///
    /// The `used_seats < seats` guard lives in the statement itself, so two
    /// concurrent claims for the last seat cannot both succeed. Returns the
    /// updated row, or `None` when the organization is missing or full.
    pub async fn try_acquire_seat(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations
             SET used_seats = used_seats + 1
             WHERE id = $1 AND used_seats < seats
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Release one seat, clamping at zero.
    pub async fn release_seat(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE organizations SET used_seats = GREATEST(used_seats - 1, 0) WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether the organization has at least one free seat.
    pub async fn has_available_seats(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let available: Option<bool> =
            sqlx::query_scalar("SELECT used_seats < seats FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(available.unwrap_or(false))
    }
}
