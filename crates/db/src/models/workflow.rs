//! Approval workflow and step models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;
use veriguard_core::permissions::OrgRole;
use veriguard_core::types::{DbId, Timestamp};
use veriguard_core::workflow::{ApprovalStep as CoreStep, Decision};

/// Full workflow row from the `approval_workflows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalWorkflow {
    pub id: DbId,
    pub organization_id: DbId,
    pub vendor_id: DbId,
    /// Parseable as `veriguard_core::workflow::WorkflowType`.
    pub workflow_type: String,
    pub name: String,
    /// Parseable as `veriguard_core::workflow::WorkflowStatus`.
    pub status: String,
    pub requested_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full step row from the `approval_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalStepRow {
    pub id: DbId,
    pub workflow_id: DbId,
    pub step_order: i32,
    pub approver_role: String,
    pub approver_user_id: Option<DbId>,
    pub decision: Option<String>,
    pub comments: Option<String>,
    pub conditions: Vec<String>,
    pub carried_conditions: Vec<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApprovalStepRow {
    /// Convert a stored step into the engine's in-memory representation.
    ///
    /// Fails when the stored role or decision strings are not part of the
    /// engine vocabulary (which would indicate data written outside the
    /// API).
    pub fn to_core(&self) -> Result<CoreStep, String> {
        let decision = match &self.decision {
            Some(d) => Some(Decision::from_str(d)?),
            None => None,
        };
        Ok(CoreStep {
            step_order: self.step_order,
            approver_role: OrgRole::from_str(&self.approver_role)?,
            approver_user_id: self.approver_user_id,
            decision,
            comments: self.comments.clone(),
            conditions: self.conditions.clone(),
            carried_conditions: self.carried_conditions.clone(),
            decided_at: self.decided_at,
        })
    }
}

/// One chain entry in a workflow creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStep {
    pub approver_role: String,
    pub approver_user_id: Option<DbId>,
}

/// DTO for creating a workflow with its approval chain.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkflow {
    pub vendor_id: DbId,
    pub workflow_type: String,
    #[validate(length(min = 1, max = 300))]
    pub name: String,
    #[validate(length(min = 1, message = "approval chain must contain at least one step"))]
    pub approval_chain: Vec<CreateStep>,
}

/// Request body for submitting a step decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitDecision {
    pub step_order: i32,
    pub decision: String,
    pub comments: Option<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// A workflow with its ordered steps, as returned by detail endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDetail {
    #[serde(flatten)]
    pub workflow: ApprovalWorkflow,
    pub steps: Vec<ApprovalStepRow>,
}
