//! Recurring schedule enqueuer.
//!
//! Ticks hourly and enqueues the recurring jobs whose slot has come
//! around: the overdue-task scan every hour, contract expiry reminders
//! daily at 09:00 UTC, the vendor monitoring sweep every six hours, and
//! cleanup weekly on Sunday at 02:00 UTC. Dedup keys carry the period
//! bucket, so a restarted scheduler cannot double-enqueue a slot.

use std::time::Duration;

use chrono::{Datelike, Timelike, Utc, Weekday};
use tokio_util::sync::CancellationToken;
use veriguard_db::models::job::job_type;
use veriguard_db::repositories::JobRepo;
use veriguard_db::DbPool;

/// How often the scheduler wakes to evaluate its slots.
const TICK_INTERVAL: Duration = Duration::from_secs(3600);

/// UTC hour for the daily contract expiry reminder run.
const CONTRACT_REMINDER_HOUR: u32 = 9;

/// UTC hour for the weekly cleanup run.
const CLEANUP_HOUR: u32 = 2;

/// Background service that feeds recurring jobs into the queue.
pub struct Scheduler {
    pool: DbPool,
}

impl Scheduler {
    /// Create a new scheduler with the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the scheduler loop until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.enqueue_due_slots().await {
                        tracing::error!(error = %e, "Failed to enqueue scheduled jobs");
                    }
                }
            }
        }
    }

    /// Enqueue every schedule whose slot matches the current hour.
    async fn enqueue_due_slots(&self) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let hour_bucket = now.format("%Y-%m-%dT%H").to_string();
        let day_bucket = now.format("%Y-%m-%d").to_string();
        let week_bucket = format!("{}-W{:02}", now.iso_week().year(), now.iso_week().week());

        // Hourly: overdue task scan.
        self.enqueue(
            job_type::OVERDUE_TASK_SCAN,
            &format!("overdue-scan-{hour_bucket}"),
        )
        .await?;

        // Daily at 09:00 UTC: contract expiry reminders.
        if now.hour() == CONTRACT_REMINDER_HOUR {
            self.enqueue(
                job_type::CONTRACT_EXPIRY_REMINDER,
                &format!("contract-expiry-{day_bucket}"),
            )
            .await?;
        }

        // Every six hours: vendor monitoring sweep.
        if now.hour() % 6 == 0 {
            self.enqueue(
                job_type::VENDOR_MONITORING_SWEEP,
                &format!("monitoring-sweep-{hour_bucket}"),
            )
            .await?;
        }

        // Weekly on Sunday at 02:00 UTC: cleanup.
        if now.weekday() == Weekday::Sun && now.hour() == CLEANUP_HOUR {
            self.enqueue(job_type::CLEANUP, &format!("cleanup-{week_bucket}"))
                .await?;
        }

        Ok(())
    }

    /// Enqueue one job with an empty payload, deduplicated on its slot key.
    async fn enqueue(&self, job_type: &str, dedup_key: &str) -> Result<(), sqlx::Error> {
        let enqueued = JobRepo::enqueue(
            &self.pool,
            job_type,
            &serde_json::json!({}),
            Some(dedup_key),
        )
        .await?;

        match enqueued {
            Some(job) => tracing::info!(job_id = job.id, job_type, dedup_key, "Scheduled job"),
            None => tracing::debug!(job_type, dedup_key, "Slot already enqueued"),
        }
        Ok(())
    }
}
