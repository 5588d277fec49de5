//! Repository for the `tasks` table.
//!
//! Listing order and the overdue predicate are evaluated in SQL against the
//! database clock, so overdue status is never cached stale.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::task::{CreateTask, Task, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organization_id, title, description, assigned_to, assigned_by, \
    due_date, priority, status, related_vendor_id, created_at, updated_at";

/// Priority rank expression: critical 0, high 1, medium 2, low 3.
const PRIORITY_RANK: &str = "CASE priority
        WHEN 'critical' THEN 0
        WHEN 'high' THEN 1
        WHEN 'medium' THEN 2
        ELSE 3
    END";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        assigned_by: Option<DbId>,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (organization_id, title, description, assigned_to, assigned_by, due_date,
                 priority, related_vendor_id)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'medium'), $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(organization_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assigned_to)
            .bind(assigned_by)
            .bind(input.due_date)
            .bind(&input.priority)
            .bind(input.related_vendor_id)
            .fetch_one(pool)
            .await
    }

    /// Find a task by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's tasks in dispatch order: priority rank
    /// ascending, due date ascending, undated last.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
        status: Option<&str>,
        assigned_to: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE organization_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::BIGINT IS NULL OR assigned_to = $3)
             ORDER BY {PRIORITY_RANK} ASC, due_date ASC NULLS LAST
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(organization_id)
            .bind(status)
            .bind(assigned_to)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Overdue tasks: still live and past due, evaluated against NOW().
    pub async fn list_overdue(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE organization_id = $1
               AND status NOT IN ('completed', 'cancelled')
               AND due_date IS NOT NULL AND due_date < NOW()
             ORDER BY {PRIORITY_RANK} ASC, due_date ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Overdue tasks across every organization, for the hourly scan.
    pub async fn list_overdue_all(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE status NOT IN ('completed', 'cancelled')
               AND due_date IS NOT NULL AND due_date < NOW()
             ORDER BY organization_id, {PRIORITY_RANK} ASC, due_date ASC"
        );
        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Update a task. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                assigned_to = COALESCE($5, assigned_to),
                due_date = COALESCE($6, due_date),
                priority = COALESCE($7, priority),
                status = COALESCE($8, status)
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assigned_to)
            .bind(input.due_date)
            .bind(&input.priority)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }
}
