//! Handlers for the vendor assessment lifecycle.
//!
//! Status moves strictly forward through the core state machine.
//! Completion records the overall score and recommendations, then
//! recomputes the vendor's residual risk score synchronously.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;

use veriguard_core::assessment::{self, AssessmentStatus, AssessmentType};
use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::Permission;
use veriguard_core::types::DbId;
use veriguard_db::models::assessment::{
    ChangeAssessmentStatus, CompleteAssessment, CreateAssessment, VendorAssessment,
};
use veriguard_db::repositories::AssessmentRepo;
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::vendors::{ensure_vendor_exists, recompute_residual};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch an assessment within the organization or fail with 404.
async fn ensure_assessment_exists(
    state: &AppState,
    id: DbId,
    org_id: DbId,
) -> AppResult<VendorAssessment> {
    AssessmentRepo::find_scoped(&state.pool, id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "VendorAssessment",
                id,
            })
        })
}

/// POST /api/v1/assessments
///
/// Start a new assessment cycle. Manually created assessments enter the
/// machine at `draft`; triggered reassessments are created by the
/// monitoring pipeline, not this endpoint.
pub async fn create_assessment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAssessment>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentCreate, org_id).await?;

    let details = json!({"vendor_id": input.vendor_id, "assessment_type": &input.assessment_type});
    let result = async {
        let kind = AssessmentType::from_str(&input.assessment_type)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        if kind == AssessmentType::TriggeredReassessment {
            return Err(AppError::Core(CoreError::Validation(
                "Triggered reassessments are created by the monitoring service".into(),
            )));
        }
        ensure_vendor_exists(&state, input.vendor_id, org_id).await?;

        Ok(AssessmentRepo::create(
            &state.pool,
            org_id,
            input.vendor_id,
            kind.as_str(),
            AssessmentStatus::Draft.as_str(),
            input.due_date,
        )
        .await?)
    }
    .await;

    let created = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "vendor_assessment",
        details,
        result,
        |a: &VendorAssessment| Some(a.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/vendors/{vendor_id}/assessments
pub async fn list_for_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentView, org_id).await?;

    ensure_vendor_exists(&state, vendor_id, org_id).await?;
    let assessments = AssessmentRepo::list_for_vendor(&state.pool, vendor_id, org_id).await?;
    Ok(Json(DataResponse { data: assessments }))
}

/// GET /api/v1/assessments/{assessment_id}
pub async fn get_assessment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentView, org_id).await?;

    let assessment = ensure_assessment_exists(&state, assessment_id, org_id).await?;
    Ok(Json(DataResponse { data: assessment }))
}

/// POST /api/v1/assessments/{assessment_id}/status
///
/// Advance the assessment through the forward-only state machine.
/// Completion and approval have dedicated endpoints; this one refuses
/// them so scores cannot be skipped.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
    Json(input): Json<ChangeAssessmentStatus>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentSubmit, org_id).await?;

    let details = json!({"status": &input.status});
    let result = async {
        let to = AssessmentStatus::from_str(&input.status)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        if matches!(to, AssessmentStatus::Completed | AssessmentStatus::Approved) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Use the dedicated endpoint to move an assessment to {}",
                to.as_str()
            ))));
        }

        let current = ensure_assessment_exists(&state, assessment_id, org_id).await?;
        let from = AssessmentStatus::from_str(&current.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        assessment::validate_transition(from, to).map_err(AppError::Core)?;

        AssessmentRepo::set_status(&state.pool, assessment_id, to.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "VendorAssessment",
                    id: assessment_id,
                })
            })
    }
    .await;

    let updated = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "vendor_assessment",
        details,
        result,
        |a: &VendorAssessment| Some(a.id),
    )
    .await?;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/assessments/{assessment_id}/complete
///
/// Move a pending-review assessment to `completed`, record the overall
/// score and recommendations, and synchronously recompute the vendor's
/// residual risk score.
pub async fn complete_assessment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
    Json(input): Json<CompleteAssessment>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentReview, org_id).await?;

    let details = json!({"overall_score": input.overall_score});
    let result = async {
        assessment::validate_overall_score(input.overall_score).map_err(AppError::Core)?;

        let current = ensure_assessment_exists(&state, assessment_id, org_id).await?;
        let from = AssessmentStatus::from_str(&current.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        assessment::validate_transition(from, AssessmentStatus::Completed)
            .map_err(AppError::Core)?;

        let completed = AssessmentRepo::complete(
            &state.pool,
            assessment_id,
            input.overall_score,
            &input.recommendations,
        )
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "VendorAssessment",
                id: assessment_id,
            })
        })?;

        // The recompute is part of completing, not a background follow-up.
        let vendor = ensure_vendor_exists(&state, completed.vendor_id, org_id).await?;
        recompute_residual(&state, &vendor).await?;

        Ok(completed)
    }
    .await;

    let completed = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "vendor_assessment",
        details,
        result,
        |a: &VendorAssessment| Some(a.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::ASSESSMENT_COMPLETED)
            .with_org(org_id)
            .with_source("vendor_assessment", completed.id)
            .with_actor(auth.user_id)
            .with_payload(json!({"overall_score": completed.overall_score})),
    );

    Ok(Json(DataResponse { data: completed }))
}

/// POST /api/v1/assessments/{assessment_id}/approve
pub async fn approve_assessment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::AssessmentApprove, org_id).await?;

    let details = json!({"assessment_id": assessment_id});
    let result = async {
        let current = ensure_assessment_exists(&state, assessment_id, org_id).await?;
        let from = AssessmentStatus::from_str(&current.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        assessment::validate_transition(from, AssessmentStatus::Approved)
            .map_err(AppError::Core)?;

        AssessmentRepo::set_status(&state.pool, assessment_id, AssessmentStatus::Approved.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "VendorAssessment",
                    id: assessment_id,
                })
            })
    }
    .await;

    let approved = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "vendor_assessment",
        details,
        result,
        |a: &VendorAssessment| Some(a.id),
    )
    .await?;

    Ok(Json(DataResponse { data: approved }))
}
