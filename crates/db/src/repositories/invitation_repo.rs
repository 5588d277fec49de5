//! Repository for the `invitations` table.

use sqlx::PgPool;
use veriguard_core::types::{DbId, Timestamp};

use crate::models::invitation::Invitation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, email, role, token, status, invited_by, \
    expires_at, accepted_at, created_at, updated_at";

/// Provides CRUD operations for invitations.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new pending invitation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        email: &str,
        role: &str,
        token: &str,
        invited_by: Option<DbId>,
        expires_at: Timestamp,
    ) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitations (organization_id, email, role, token, invited_by, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(organization_id)
            .bind(email)
            .bind(role)
            .bind(token)
            .bind(invited_by)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an invitation by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an invitation by its token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE token = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Mark a pending invitation accepted.
    ///
    /// The `status = 'pending'` guard makes consumption single-use even
    /// under concurrent accepts: only one caller sees a row come back.
    pub async fn mark_accepted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!(
            "UPDATE invitations SET status = 'accepted', accepted_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reopen an accepted invitation.
    ///
    /// Compensation for an accept whose user creation failed (seats
    /// exhausted, duplicate email): the token becomes consumable again
    /// instead of being burned by a failed attempt.
    pub async fn reopen(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE invitations SET status = 'pending', accepted_at = NULL
             WHERE id = $1 AND status = 'accepted'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List an organization's invitations, newest first.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations
             WHERE organization_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Sweep pending invitations past their expiry into `expired`.
    ///
    /// Returns the number of rows expired. Run by the weekly cleanup job;
    /// `find_by_token` callers also check expiry at read time, so a lapsed
    /// but unswept invitation can never be consumed.
    pub async fn expire_lapsed(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET status = 'expired'
             WHERE status = 'pending' AND expires_at <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
