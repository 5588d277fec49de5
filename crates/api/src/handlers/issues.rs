//! Handlers for vendor issues (findings).
//!
//! Manual issue creation and remediation status transitions. Every change
//! to the open-issue set recomputes the vendor's residual risk score.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::issues::{self, IssuePriority, IssueSeverity, IssueSource, IssueStatus};
use veriguard_core::permissions::Permission;
use veriguard_core::types::DbId;
use veriguard_db::models::issue::{ChangeIssueStatus, CreateIssue, VendorIssue};
use veriguard_db::repositories::IssueRepo;
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::vendors::{ensure_vendor_exists, recompute_residual};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/issues
///
/// Raise an issue manually. Monitoring-sourced issues are created by the
/// signal pipeline with source `continuous_monitoring`.
pub async fn create_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateIssue>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::IssueCreate, org_id).await?;

    let details = json!({"vendor_id": input.vendor_id, "severity": &input.severity});
    let result = async {
        input.validate()?;
        IssueSeverity::from_str(&input.severity)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        let priority = match &input.priority {
            Some(p) => IssuePriority::from_str(p)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?,
            None => IssuePriority::Medium,
        };
        let category = match &input.category {
            Some(c) => veriguard_core::issues::IssueCategory::from_str(c)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?,
            None => veriguard_core::issues::IssueCategory::Other,
        };

        let vendor = ensure_vendor_exists(&state, input.vendor_id, org_id).await?;

        let issue = IssueRepo::create(
            &state.pool,
            org_id,
            input.vendor_id,
            &input.title,
            input.description.as_deref(),
            &input.severity,
            priority.as_str(),
            IssueSource::Manual.as_str(),
            category.as_str(),
        )
        .await?;

        recompute_residual(&state, &vendor).await?;
        Ok(issue)
    }
    .await;

    let issue = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "vendor_issue",
        details,
        result,
        |i: &VendorIssue| Some(i.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::ISSUE_CREATED)
            .with_org(org_id)
            .with_source("vendor_issue", issue.id)
            .with_actor(auth.user_id)
            .with_payload(json!({"severity": issue.severity, "source": issue.source})),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: issue })))
}

/// GET /api/v1/vendors/{vendor_id}/issues
pub async fn list_for_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::IssueView, org_id).await?;

    ensure_vendor_exists(&state, vendor_id, org_id).await?;
    let issues =
        IssueRepo::list_for_vendor(&state.pool, vendor_id, org_id, params.status.as_deref())
            .await?;
    Ok(Json(DataResponse { data: issues }))
}

/// GET /api/v1/issues/{issue_id}
pub async fn get_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::IssueView, org_id).await?;

    let issue = IssueRepo::find_scoped(&state.pool, issue_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "VendorIssue",
                id: issue_id,
            })
        })?;

    Ok(Json(DataResponse { data: issue }))
}

/// POST /api/v1/issues/{issue_id}/status
///
/// Move an issue through the remediation machine. Resolving, accepting the
/// risk, or closing requires the stronger `IssueResolve` permission.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(issue_id): Path<DbId>,
    Json(input): Json<ChangeIssueStatus>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;

    let to = IssueStatus::from_str(&input.status)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let needed = if to.is_open() {
        Permission::IssueUpdate
    } else {
        Permission::IssueResolve
    };
    require_permission(&state, &auth, needed, org_id).await?;

    let details = json!({"status": &input.status});
    let result = async {
        let current = IssueRepo::find_scoped(&state.pool, issue_id, org_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "VendorIssue",
                    id: issue_id,
                })
            })?;
        let from = IssueStatus::from_str(&current.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        issues::validate_transition(from, to).map_err(AppError::Core)?;

        let updated = IssueRepo::set_status(&state.pool, issue_id, org_id, to.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "VendorIssue",
                    id: issue_id,
                })
            })?;

        let vendor = ensure_vendor_exists(&state, updated.vendor_id, org_id).await?;
        recompute_residual(&state, &vendor).await?;

        Ok(updated)
    }
    .await;

    let updated = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "vendor_issue",
        details,
        result,
        |i: &VendorIssue| Some(i.id),
    )
    .await?;

    Ok(Json(DataResponse { data: updated }))
}
