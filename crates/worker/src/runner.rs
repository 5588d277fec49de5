//! Job queue runner.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use veriguard_db::models::job::{job_type, Job};
use veriguard_db::DbPool;

use crate::jobs;

/// How often the runner polls for runnable jobs when the queue is idle.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Claims and executes queued jobs until cancelled.
pub struct JobRunner {
    pool: DbPool,
}

impl JobRunner {
    /// Create a runner over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the claim/dispatch loop.
    ///
    /// Drains the queue, then sleeps for [`POLL_INTERVAL`] before polling
    /// again. Exits gracefully when the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job runner cancelled");
                    break;
                }
                claimed = veriguard_db::repositories::JobRepo::claim_next(&self.pool) => {
                    match claimed {
                        Ok(Some(job)) => self.execute(job).await,
                        Ok(None) => tokio::time::sleep(POLL_INTERVAL).await,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to claim job");
                            tokio::time::sleep(POLL_INTERVAL).await;
                        }
                    }
                }
            }
        }
    }

    /// Dispatch one claimed job and record its outcome.
    async fn execute(&self, job: Job) {
        tracing::info!(job_id = job.id, job_type = %job.job_type, attempt = job.attempts, "Executing job");

        let outcome = match job.job_type.as_str() {
            job_type::OVERDUE_TASK_SCAN => jobs::overdue_tasks::run(&self.pool).await,
            job_type::CONTRACT_EXPIRY_REMINDER => jobs::contract_expiry::run(&self.pool).await,
            job_type::VENDOR_MONITORING_SWEEP => jobs::monitoring_sweep::run(&self.pool).await,
            job_type::CLEANUP => jobs::cleanup::run(&self.pool).await,
            job_type::SEND_INVITATION_EMAIL => {
                jobs::invitation_email::run(&self.pool, &job.payload).await
            }
            other => Err(format!("Unknown job type '{other}'")),
        };

        let result = match outcome {
            Ok(()) => veriguard_db::repositories::JobRepo::mark_completed(&self.pool, job.id).await,
            Err(e) => {
                tracing::error!(job_id = job.id, error = %e, "Job failed");
                veriguard_db::repositories::JobRepo::mark_failed(&self.pool, job.id, &e).await
            }
        };

        if let Err(e) = result {
            tracing::error!(job_id = job.id, error = %e, "Failed to record job outcome");
        }
    }
}
