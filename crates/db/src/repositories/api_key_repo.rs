//! Repository for the `api_keys` table.

use sqlx::PgPool;
use veriguard_core::types::{DbId, Timestamp};

use crate::models::api_key::ApiKey;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, name, key_prefix, key_hash, scopes, rate_limit, \
    is_active, expires_at, last_used_at, created_by, created_at, updated_at";

/// Provides CRUD operations for API keys.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// Insert a new key, returning the created row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        name: &str,
        key_prefix: &str,
        key_hash: &str,
        scopes: &[String],
        rate_limit: i32,
        expires_at: Option<Timestamp>,
        created_by: Option<DbId>,
    ) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys
                (organization_id, name, key_prefix, key_hash, scopes, rate_limit, expires_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(organization_id)
            .bind(name)
            .bind(key_prefix)
            .bind(key_hash)
            .bind(scopes)
            .bind(rate_limit)
            .bind(expires_at)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Look up a key by the SHA-256 hash of the presented plaintext.
    pub async fn find_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE key_hash = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's keys, newest first.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_keys
             WHERE organization_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a key (is_active = false). Returns `true` if a row changed.
    pub async fn revoke(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE api_keys SET is_active = FALSE
             WHERE id = $1 AND organization_id = $2 AND is_active",
        )
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record key usage for auditability.
    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
