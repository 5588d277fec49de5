//! Repository for the `users` table.
//!
//! Every external lookup is tenant-scoped: `find_scoped` returns `None`
//! when the row exists but belongs to a different organization. The
//! unscoped `find_by_id` is reserved for trusted internal callers (JWT
//! authentication and the audit writer).

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::user::{UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, email, name, password_hash, role, department, \
    status, last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// A duplicate email within the organization hits `uq_users_org_email`
    /// and surfaces as a conflict. The caller is responsible for claiming a
    /// seat first (see `OrganizationRepo::try_acquire_seat`).
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        email: &str,
        name: &str,
        password_hash: &str,
        role: &str,
        department: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (organization_id, email, name, password_hash, role, department)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(organization_id)
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .bind(role)
            .bind(department)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID without tenant scoping.
    ///
    /// Trusted internal callers only; handlers must use [`Self::find_scoped`].
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID within an organization.
    ///
    /// Returns `None` when the user does not exist *or* belongs to another
    /// tenant; callers cannot distinguish the two, by design.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email within an organization (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        organization_id: DbId,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE organization_id = $1 AND email = $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(organization_id)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's users, most recently created first.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE organization_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(organization_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a user within an organization. Only non-`None` fields apply.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                department = COALESCE($5, department)
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.department)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a user: status becomes `inactive`.
    ///
    /// Returns `true` if a row changed. The caller releases the seat.
    pub async fn deactivate(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET status = 'inactive'
             WHERE id = $1 AND organization_id = $2 AND status = 'active'",
        )
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
