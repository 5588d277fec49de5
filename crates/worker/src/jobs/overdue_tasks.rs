//! Hourly overdue-task scan.
//!
//! Overdue status itself is a query-time predicate (never cached); this
//! scan only surfaces the current overdue set as platform events so
//! assignees can be nudged.

use std::collections::BTreeMap;

use veriguard_db::repositories::{EventRepo, TaskRepo};
use veriguard_db::DbPool;

/// Scan every organization for overdue tasks and emit a summary event per
/// organization with a non-empty set.
pub async fn run(pool: &DbPool) -> Result<(), String> {
    let overdue = TaskRepo::list_overdue_all(pool)
        .await
        .map_err(|e| format!("Overdue task query failed: {e}"))?;

    if overdue.is_empty() {
        tracing::debug!("No overdue tasks");
        return Ok(());
    }

    let mut per_org: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for task in &overdue {
        per_org.entry(task.organization_id).or_default().push(task.id);
    }

    for (org_id, task_ids) in &per_org {
        EventRepo::insert(
            pool,
            Some(*org_id),
            "task.overdue_scan",
            None,
            None,
            None,
            &serde_json::json!({"task_ids": task_ids, "count": task_ids.len()}),
        )
        .await
        .map_err(|e| format!("Failed to record overdue scan event: {e}"))?;

        tracing::info!(org_id, count = task_ids.len(), "Overdue tasks found");
    }

    Ok(())
}
