//! Repository for the `events` table (durable platform event capture).

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::event::EventRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, event_type, source_entity_type, source_entity_id, \
    actor_user_id, payload, created_at";

/// Provides append and query operations for persisted events.
pub struct EventRepo;

impl EventRepo {
    /// Append an event row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        organization_id: Option<DbId>,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<EventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (organization_id, event_type, source_entity_type, source_entity_id,
                 actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(organization_id)
            .bind(event_type)
            .bind(source_entity_type)
            .bind(source_entity_id)
            .bind(actor_user_id)
            .bind(payload)
            .fetch_one(pool)
            .await
    }

    /// Most recent events for an organization.
    pub async fn list_recent(
        pool: &PgPool,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE organization_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(organization_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete events older than the retention window. Returns rows removed.
    pub async fn prune_older_than_days(pool: &PgPool, days: i64) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM events WHERE created_at < NOW() - ($1 * INTERVAL '1 day')")
                .bind(days)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
