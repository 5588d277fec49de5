//! Handlers for the approval workflow engine.
//!
//! The sequencing rules live in `veriguard_core::workflow`; these handlers
//! load the stored chain, run the engine in memory, and persist the
//! resulting step states and workflow status atomically.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::{OrgRole, Permission};
use veriguard_core::types::DbId;
use veriguard_core::workflow::{
    self, Decision, WorkflowStatus, WorkflowType,
};
use veriguard_db::models::workflow::{
    ApprovalWorkflow, CreateWorkflow, SubmitDecision, WorkflowDetail,
};
use veriguard_db::repositories::WorkflowRepo;
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::vendors::ensure_vendor_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a workflow within the organization or fail with 404.
async fn ensure_workflow_exists(
    state: &AppState,
    id: DbId,
    org_id: DbId,
) -> AppResult<ApprovalWorkflow> {
    WorkflowRepo::find_scoped(&state.pool, id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ApprovalWorkflow",
                id,
            })
        })
}

/// POST /api/v1/workflows
///
/// Create a workflow with its approval chain (minimum one step). Step
/// orders are assigned from the chain's position, 1-based.
pub async fn create_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkflow>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::WorkflowCreate, org_id).await?;

    let details = json!({
        "vendor_id": input.vendor_id,
        "workflow_type": &input.workflow_type,
        "steps": input.approval_chain.len(),
    });
    let result = async {
        input.validate()?;
        WorkflowType::from_str(&input.workflow_type)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        for step in &input.approval_chain {
            OrgRole::from_str(&step.approver_role)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        }
        ensure_vendor_exists(&state, input.vendor_id, org_id).await?;

        Ok(WorkflowRepo::create(
            &state.pool,
            org_id,
            input.vendor_id,
            &input.workflow_type,
            &input.name,
            Some(auth.user_id),
            &input.approval_chain,
        )
        .await?)
    }
    .await;

    let workflow = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "approval_workflow",
        details,
        result,
        |w: &ApprovalWorkflow| Some(w.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: workflow })))
}

/// GET /api/v1/workflows
pub async fn list_workflows(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::WorkflowView, org_id).await?;

    let workflows = WorkflowRepo::list_for_org(
        &state.pool,
        org_id,
        params.status.as_deref(),
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: workflows }))
}

/// GET /api/v1/workflows/{workflow_id}
pub async fn get_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::WorkflowView, org_id).await?;

    let workflow = ensure_workflow_exists(&state, workflow_id, org_id).await?;
    let steps = WorkflowRepo::load_steps(&state.pool, workflow_id).await?;

    Ok(Json(DataResponse {
        data: WorkflowDetail { workflow, steps },
    }))
}

/// POST /api/v1/workflows/{workflow_id}/decisions
///
/// Submit a decision for the current pending step. The engine rejects
/// out-of-order submissions; a rejection or escalation halts the chain;
/// deferral leaves the step pending for resubmission.
pub async fn submit_decision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
    Json(input): Json<SubmitDecision>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::WorkflowDecide, org_id).await?;

    let details = json!({"step_order": input.step_order, "decision": &input.decision});
    let result = async {
        let decision = Decision::from_str(&input.decision)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

        ensure_workflow_exists(&state, workflow_id, org_id).await?;
        let rows = WorkflowRepo::load_steps(&state.pool, workflow_id).await?;

        let mut steps = Vec::with_capacity(rows.len());
        for row in &rows {
            steps.push(
                row.to_core()
                    .map_err(|e| AppError::Core(CoreError::Internal(e)))?,
            );
        }

        // The deciding user must be the step's pinned approver, or hold
        // the step's approver role.
        if let Some(target) = steps.iter().find(|s| s.step_order == input.step_order) {
            let pinned_to_other = matches!(target.approver_user_id, Some(u) if u != auth.user_id);
            let role_matches = auth.role == target.approver_role.as_str();
            if pinned_to_other || (target.approver_user_id.is_none() && !role_matches) {
                return Err(AppError::Core(CoreError::Forbidden(format!(
                    "Step {} is assigned to the {} role",
                    target.step_order,
                    target.approver_role.as_str()
                ))));
            }
        }

        let status = workflow::submit_decision(
            &mut steps,
            input.step_order,
            decision,
            input.comments.clone(),
            input.conditions.clone(),
            chrono::Utc::now(),
        )
        .map_err(AppError::Core)?;

        let completed = status == WorkflowStatus::Completed;
        WorkflowRepo::save_decision(&state.pool, workflow_id, &steps, status.as_str(), completed)
            .await?;

        Ok(status)
    }
    .await;

    let status = audit::finish(
        &state,
        Some(&auth),
        actions::SUBMIT_DECISION,
        "approval_workflow",
        details,
        result,
        |_: &WorkflowStatus| Some(workflow_id),
    )
    .await?;

    match status {
        WorkflowStatus::Completed => {
            state.event_bus.publish(
                PlatformEvent::new(event_types::WORKFLOW_COMPLETED)
                    .with_org(org_id)
                    .with_source("approval_workflow", workflow_id)
                    .with_actor(auth.user_id),
            );
        }
        WorkflowStatus::Rejected | WorkflowStatus::Escalated => {
            state.event_bus.publish(
                PlatformEvent::new(event_types::WORKFLOW_HALTED)
                    .with_org(org_id)
                    .with_source("approval_workflow", workflow_id)
                    .with_actor(auth.user_id)
                    .with_payload(json!({"status": status.as_str()})),
            );
        }
        _ => {}
    }

    let workflow = ensure_workflow_exists(&state, workflow_id, org_id).await?;
    let steps = WorkflowRepo::load_steps(&state.pool, workflow_id).await?;
    Ok(Json(DataResponse {
        data: WorkflowDetail { workflow, steps },
    }))
}

/// POST /api/v1/workflows/{workflow_id}/cancel
pub async fn cancel_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::WorkflowCancel, org_id).await?;

    let details = json!({"workflow_id": workflow_id});
    let result = async {
        ensure_workflow_exists(&state, workflow_id, org_id).await?;
        WorkflowRepo::cancel(&state.pool, workflow_id, org_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Only in-progress workflows can be cancelled".into(),
                ))
            })
    }
    .await;

    let workflow = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "approval_workflow",
        details,
        result,
        |w: &ApprovalWorkflow| Some(w.id),
    )
    .await?;

    Ok(Json(DataResponse { data: workflow }))
}
