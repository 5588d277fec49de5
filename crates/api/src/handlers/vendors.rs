//! Handlers for vendor CRUD, tiering, and status lifecycle.
//!
//! Also home to [`recompute_residual`], the synchronous residual risk
//! recomputation shared by the assessment, issue, and monitoring handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::Permission;
use veriguard_core::scoring::residual_vendor_score;
use veriguard_core::types::DbId;
use veriguard_core::vendor::{self, VendorStatus, VendorTier};
use veriguard_db::models::vendor::{
    ChangeVendorStatus, ChangeVendorTier, CreateVendor, UpdateVendor, Vendor,
};
use veriguard_db::repositories::{AssessmentRepo, IssueRepo, VendorRepo};
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::VendorListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a vendor within the organization or fail with 404.
pub async fn ensure_vendor_exists(
    state: &AppState,
    vendor_id: DbId,
    org_id: DbId,
) -> AppResult<Vendor> {
    VendorRepo::find_scoped(&state.pool, vendor_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Vendor",
                id: vendor_id,
            })
        })
}

/// Recompute and persist a vendor's residual risk score.
///
/// Runs synchronously whenever an assessment completes, an issue is raised
/// or changes status, or a monitoring signal lands. Base risk comes from
/// the latest completed assessment (inherent score standing in when there
/// is none) plus a penalty per open issue.
pub async fn recompute_residual(state: &AppState, vendor: &Vendor) -> AppResult<f64> {
    let latest_score = AssessmentRepo::latest_completed_score(&state.pool, vendor.id).await?;
    let severities = IssueRepo::open_severities_for_vendor(&state.pool, vendor.id).await?;

    let mut parsed = Vec::with_capacity(severities.len());
    for s in &severities {
        parsed.push(
            veriguard_core::issues::IssueSeverity::from_str(s)
                .map_err(|e| AppError::Core(CoreError::Internal(e)))?,
        );
    }

    let score = residual_vendor_score(vendor.inherent_risk_score, latest_score, &parsed);
    VendorRepo::set_residual_score(&state.pool, vendor.id, score).await?;

    tracing::debug!(vendor_id = vendor.id, score, "Residual risk score recomputed");
    Ok(score)
}

/// POST /api/v1/vendors
pub async fn create_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVendor>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorCreate, org_id).await?;

    let details = json!({"name": &input.name, "tier": &input.tier});
    let result = async {
        input.validate()?;
        VendorTier::from_str(&input.tier)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        if let Some(score) = input.inherent_risk_score {
            if !(0.0..=100.0).contains(&score) {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Inherent risk score must be between 0 and 100, got {score}"
                ))));
            }
        }
        Ok(VendorRepo::create(&state.pool, org_id, &input).await?)
    }
    .await;

    let vendor = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "vendor",
        details,
        result,
        |v: &Vendor| Some(v.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::VENDOR_CREATED)
            .with_org(org_id)
            .with_source("vendor", vendor.id)
            .with_actor(auth.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}

/// GET /api/v1/vendors
pub async fn list_vendors(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<VendorListParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorView, org_id).await?;

    let vendors = VendorRepo::list_for_org(
        &state.pool,
        org_id,
        params.tier.as_deref(),
        params.status.as_deref(),
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: vendors }))
}

/// GET /api/v1/vendors/{vendor_id}
pub async fn get_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorView, org_id).await?;

    let vendor = ensure_vendor_exists(&state, vendor_id, org_id).await?;
    Ok(Json(DataResponse { data: vendor }))
}

/// PATCH /api/v1/vendors/{vendor_id}
pub async fn update_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<UpdateVendor>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorUpdate, org_id).await?;

    let details = json!({"fields": &input});
    let result = async {
        VendorRepo::update(&state.pool, vendor_id, org_id, &input)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Vendor",
                    id: vendor_id,
                })
            })
    }
    .await;

    let vendor = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "vendor",
        details,
        result,
        |v: &Vendor| Some(v.id),
    )
    .await?;

    Ok(Json(DataResponse { data: vendor }))
}

/// POST /api/v1/vendors/{vendor_id}/status
///
/// Transition the vendor's lifecycle status, validated against the status
/// state machine.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<ChangeVendorStatus>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorUpdate, org_id).await?;

    let details = json!({"status": &input.status});
    let result = async {
        let to = VendorStatus::from_str(&input.status)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        let current = ensure_vendor_exists(&state, vendor_id, org_id).await?;
        let from = VendorStatus::from_str(&current.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        vendor::validate_transition(from, to).map_err(AppError::Core)?;

        VendorRepo::set_status(&state.pool, vendor_id, org_id, to.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Vendor",
                    id: vendor_id,
                })
            })
    }
    .await;

    let vendor = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "vendor",
        details,
        result,
        |v: &Vendor| Some(v.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::VENDOR_STATUS_CHANGED)
            .with_org(org_id)
            .with_source("vendor", vendor.id)
            .with_actor(auth.user_id)
            .with_payload(json!({"status": vendor.status})),
    );

    Ok(Json(DataResponse { data: vendor }))
}

/// POST /api/v1/vendors/{vendor_id}/tier
///
/// Change the vendor's criticality tier. Tier drives monitoring cadence;
/// any value of the ordinal is reachable from any other.
pub async fn change_tier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<ChangeVendorTier>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::VendorTierChange, org_id).await?;

    let details = json!({"tier": &input.tier});
    let result = async {
        VendorTier::from_str(&input.tier)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        ensure_vendor_exists(&state, vendor_id, org_id).await?;
        VendorRepo::set_tier(&state.pool, vendor_id, org_id, &input.tier)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Vendor",
                    id: vendor_id,
                })
            })
    }
    .await;

    let vendor = audit::finish(
        &state,
        Some(&auth),
        actions::TIER_CHANGE,
        "vendor",
        details,
        result,
        |v: &Vendor| Some(v.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::VENDOR_TIER_CHANGED)
            .with_org(org_id)
            .with_source("vendor", vendor.id)
            .with_actor(auth.user_id)
            .with_payload(json!({"tier": vendor.tier})),
    );

    Ok(Json(DataResponse { data: vendor }))
}
