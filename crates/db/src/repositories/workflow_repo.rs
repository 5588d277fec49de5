//! Repository for the `approval_workflows` and `approval_steps` tables.
//!
//! Workflow creation inserts the workflow and its chain in one transaction
//! so a half-written chain can never exist.

use sqlx::PgPool;
use veriguard_core::types::DbId;

use crate::models::workflow::{ApprovalStepRow, ApprovalWorkflow, CreateStep};

/// Column list for approval_workflows queries.
const WORKFLOW_COLUMNS: &str = "id, organization_id, vendor_id, workflow_type, name, status, \
    requested_by, completed_at, created_at, updated_at";

/// Column list for approval_steps queries.
const STEP_COLUMNS: &str = "id, workflow_id, step_order, approver_role, approver_user_id, \
    decision, comments, conditions, carried_conditions, decided_at, created_at, updated_at";

/// Provides CRUD operations for approval workflows and their steps.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a workflow and its ordered chain atomically.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        vendor_id: DbId,
        workflow_type: &str,
        name: &str,
        requested_by: Option<DbId>,
        chain: &[CreateStep],
    ) -> Result<ApprovalWorkflow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO approval_workflows
                (organization_id, vendor_id, workflow_type, name, requested_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {WORKFLOW_COLUMNS}"
        );
        let workflow = sqlx::query_as::<_, ApprovalWorkflow>(&query)
            .bind(organization_id)
            .bind(vendor_id)
            .bind(workflow_type)
            .bind(name)
            .bind(requested_by)
            .fetch_one(&mut *tx)
            .await?;

        for (i, step) in chain.iter().enumerate() {
            sqlx::query(
                "INSERT INTO approval_steps (workflow_id, step_order, approver_role, approver_user_id)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(workflow.id)
            .bind(i as i32 + 1)
            .bind(&step.approver_role)
            .bind(step.approver_user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(workflow)
    }

    /// Find a workflow by ID within an organization.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<ApprovalWorkflow>, sqlx::Error> {
        let query = format!(
            "SELECT {WORKFLOW_COLUMNS} FROM approval_workflows
             WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, ApprovalWorkflow>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's workflows with an optional status filter.
    pub async fn list_for_org(
        pool: &PgPool,
        organization_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalWorkflow>, sqlx::Error> {
        let query = format!(
            "SELECT {WORKFLOW_COLUMNS} FROM approval_workflows
             WHERE organization_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ApprovalWorkflow>(&query)
            .bind(organization_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Load a workflow's steps in chain order.
    pub async fn load_steps(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Vec<ApprovalStepRow>, sqlx::Error> {
        let query = format!(
            "SELECT {STEP_COLUMNS} FROM approval_steps
             WHERE workflow_id = $1
             ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, ApprovalStepRow>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Persist the engine's view of every step plus the workflow status.
    ///
    /// Runs in one transaction so a decision and its consequences (carried
    /// conditions on the next step, workflow status/completion) land
    /// together.
    pub async fn save_decision(
        pool: &PgPool,
        workflow_id: DbId,
        steps: &[veriguard_core::workflow::ApprovalStep],
        status: &str,
        completed: bool,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for step in steps {
            sqlx::query(
                "UPDATE approval_steps SET
                    decision = $3,
                    comments = $4,
                    conditions = $5,
                    carried_conditions = $6,
                    decided_at = $7
                 WHERE workflow_id = $1 AND step_order = $2",
            )
            .bind(workflow_id)
            .bind(step.step_order)
            .bind(step.decision.map(|d| d.as_str()))
            .bind(&step.comments)
            .bind(&step.conditions)
            .bind(&step.carried_conditions)
            .bind(step.decided_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE approval_workflows SET
                status = $2,
                completed_at = CASE WHEN $3 THEN COALESCE(completed_at, NOW()) ELSE completed_at END
             WHERE id = $1",
        )
        .bind(workflow_id)
        .bind(status)
        .bind(completed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Cancel an in-progress workflow. Returns the updated row.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<ApprovalWorkflow>, sqlx::Error> {
        let query = format!(
            "UPDATE approval_workflows SET status = 'cancelled'
             WHERE id = $1 AND organization_id = $2 AND status = 'in_progress'
             RETURNING {WORKFLOW_COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalWorkflow>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }
}
