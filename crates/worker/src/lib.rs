//! Veriguard background worker.
//!
//! Two cooperating loops:
//!
//! - [`Scheduler`] enqueues recurring work (overdue-task scan, contract
//!   expiry reminders, vendor monitoring sweep, weekly cleanup) into the
//!   Postgres-backed job queue, deduplicated per period.
//! - [`JobRunner`] claims jobs with `FOR UPDATE SKIP LOCKED` and dispatches
//!   them to the handlers in [`jobs`]. Delivery is at-least-once; handlers
//!   are idempotent via their dedup keys.

pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use runner::JobRunner;
pub use scheduler::Scheduler;
