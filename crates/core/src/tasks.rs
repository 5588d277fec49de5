//! Task prioritization and overdue rules (PRD-12).
//!
//! Listing order is priority rank ascending (critical first), tie-broken by
//! due date ascending; tasks without a due date sort after dated ones of the
//! same priority. Overdue status is a predicate over the current clock and
//! is always evaluated at query time.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Priority / status
// ---------------------------------------------------------------------------

/// Task priority. Rank 0 (critical) dispatches before rank 3 (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Sort rank: critical 0, high 1, medium 2, low 3.
    pub fn rank(&self) -> i16 {
        match self {
            TaskPriority::Critical => 0,
            TaskPriority::High => 1,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Critical => "critical",
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(TaskPriority::Critical),
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            other => Err(format!("Unknown task priority '{other}'")),
        }
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the task is still live (can become overdue).
    pub fn is_live(&self) -> bool {
        !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("Unknown task status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering and overdue predicate
// ---------------------------------------------------------------------------

/// Listing comparator: priority rank ascending, then due date ascending,
/// undated tasks last within their priority.
pub fn listing_order(
    a_priority: TaskPriority,
    a_due: Option<Timestamp>,
    b_priority: TaskPriority,
    b_due: Option<Timestamp>,
) -> Ordering {
    a_priority.rank().cmp(&b_priority.rank()).then_with(|| {
        match (a_due, b_due) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// A task is overdue when it is still live and its due date has passed.
///
/// Must be evaluated against the caller's `now` at query time; overdue
/// status is never cached.
pub fn is_overdue(status: TaskStatus, due_date: Option<Timestamp>, now: Timestamp) -> bool {
    status.is_live() && matches!(due_date, Some(due) if due < now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn priority_ranks() {
        assert_eq!(TaskPriority::Critical.rank(), 0);
        assert_eq!(TaskPriority::High.rank(), 1);
        assert_eq!(TaskPriority::Medium.rank(), 2);
        assert_eq!(TaskPriority::Low.rank(), 3);
    }

    #[test]
    fn critical_sorts_before_low() {
        let now = Utc::now();
        assert_eq!(
            listing_order(
                TaskPriority::Critical,
                Some(now),
                TaskPriority::Low,
                Some(now - Duration::days(30)),
            ),
            Ordering::Less
        );
    }

    #[test]
    fn equal_priority_breaks_tie_on_due_date() {
        let d1 = Utc::now();
        let d2 = d1 + Duration::days(1);
        assert_eq!(
            listing_order(TaskPriority::High, Some(d1), TaskPriority::High, Some(d2)),
            Ordering::Less
        );
        assert_eq!(
            listing_order(TaskPriority::High, Some(d2), TaskPriority::High, Some(d1)),
            Ordering::Greater
        );
    }

    #[test]
    fn undated_sorts_after_dated() {
        let now = Utc::now();
        assert_eq!(
            listing_order(TaskPriority::High, None, TaskPriority::High, Some(now)),
            Ordering::Greater
        );
    }

    #[test]
    fn overdue_requires_live_status_and_past_due() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert!(is_overdue(TaskStatus::Pending, Some(past), now));
        assert!(is_overdue(TaskStatus::InProgress, Some(past), now));
        assert!(is_overdue(TaskStatus::Blocked, Some(past), now));
        assert!(!is_overdue(TaskStatus::Completed, Some(past), now));
        assert!(!is_overdue(TaskStatus::Cancelled, Some(past), now));
        assert!(!is_overdue(TaskStatus::Pending, Some(future), now));
        assert!(!is_overdue(TaskStatus::Pending, None, now));
    }
}
