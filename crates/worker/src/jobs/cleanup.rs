//! Weekly cleanup.

use chrono::Utc;
use veriguard_db::repositories::{EventRepo, InvitationRepo, JobRepo};
use veriguard_db::DbPool;

/// Persisted events are kept this long.
const EVENT_RETENTION_DAYS: i64 = 180;

/// Completed and dead jobs are kept this long.
const JOB_RETENTION_DAYS: i64 = 30;

/// Expire lapsed invitations and prune old events and finished jobs.
pub async fn run(pool: &DbPool) -> Result<(), String> {
    let expired = InvitationRepo::expire_lapsed(pool, Utc::now())
        .await
        .map_err(|e| format!("Invitation expiry sweep failed: {e}"))?;

    let pruned_events = EventRepo::prune_older_than_days(pool, EVENT_RETENTION_DAYS)
        .await
        .map_err(|e| format!("Event pruning failed: {e}"))?;

    let pruned_jobs = JobRepo::prune_finished_older_than_days(pool, JOB_RETENTION_DAYS)
        .await
        .map_err(|e| format!("Job pruning failed: {e}"))?;

    tracing::info!(
        expired_invitations = expired,
        pruned_events,
        pruned_jobs,
        "Cleanup complete"
    );
    Ok(())
}
