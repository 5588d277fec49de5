//! Repository for the `jobs` table (Postgres-backed work queue).
//!
//! Delivery is at-least-once: a claimed job that never completes is retried
//! once its attempt is released. Enqueue dedups on `dedup_key`, so handlers
//! triggered twice for the same logical work collapse into one row.

use sqlx::PgPool;

use veriguard_core::types::DbId;

use crate::models::job::Job;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, job_type, payload, dedup_key, status, attempts, max_attempts, \
    run_at, last_error, created_at, updated_at";

/// Retry backoff between attempts, in minutes.
const RETRY_BACKOFF_MINS: i64 = 5;

/// Provides queue operations for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Enqueue a job, deduplicating on `dedup_key`.
    ///
    /// Returns the created row, or `None` when an identical dedup key
    /// already exists (the work is already queued or done).
    pub async fn enqueue(
        pool: &PgPool,
        job_type: &str,
        payload: &serde_json::Value,
        dedup_key: Option<&str>,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, payload, dedup_key)
             VALUES ($1, $2, $3)
             ON CONFLICT (dedup_key) WHERE dedup_key IS NOT NULL DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_type)
            .bind(payload)
            .bind(dedup_key)
            .fetch_optional(pool)
            .await
    }

    /// Claim the next runnable job.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets multiple workers poll the same table
    /// without handing the same job to two of them.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status = 'running', attempts = attempts + 1
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE status = 'pending' AND run_at <= NOW()
                 ORDER BY run_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query).fetch_optional(pool).await
    }

    /// Mark a job completed.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET status = 'completed' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a failed attempt.
    ///
    /// Reschedules with backoff while attempts remain; otherwise the job is
    /// dead and waits for operator attention.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET
                status = CASE WHEN attempts >= max_attempts THEN 'dead' ELSE 'pending' END,
                run_at = NOW() + ($2 * INTERVAL '1 minute'),
                last_error = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(RETRY_BACKOFF_MINS)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete completed or dead jobs older than the retention window.
    pub async fn prune_finished_older_than_days(
        pool: &PgPool,
        days: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM jobs
             WHERE status IN ('completed', 'dead')
               AND updated_at < NOW() - ($1 * INTERVAL '1 day')",
        )
        .bind(days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
