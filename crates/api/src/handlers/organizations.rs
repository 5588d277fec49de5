//! Handlers for organization (tenant) lifecycle.
//!
//! Signup is public and creates the organization together with its owner
//! account. Everything else requires authentication and operates on the
//! caller's own organization.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::{OrgRole, Permission};
use veriguard_core::tenancy::{self, OrgStatus};
use veriguard_core::types::DbId;
use veriguard_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use veriguard_db::models::user::{CreateUser, UserResponse};
use veriguard_db::repositories::{OrganizationRepo, UserRepo};
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// Signup payload: the tenant plus its owner account.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub organization: CreateOrganization,
    pub owner: CreateUser,
}

/// Signup response.
#[derive(Debug, serde::Serialize)]
pub struct SignupResponse {
    pub organization: Organization,
    pub owner: UserResponse,
}

/// POST /api/v1/organizations
///
/// Public tenant signup. Creates the organization and its owner user; the
/// owner's requested role is ignored and forced to `org_owner`.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let details = json!({"name": &input.organization.name, "subdomain": &input.organization.subdomain});
    let result = do_signup(&state, input).await;
    let response = audit::finish(
        &state,
        None,
        actions::CREATE,
        "organization",
        details,
        result,
        |r| Some(r.organization.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::ORGANIZATION_CREATED)
            .with_org(response.organization.id)
            .with_source("organization", response.organization.id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

async fn do_signup(state: &AppState, input: SignupRequest) -> AppResult<SignupResponse> {
    input.organization.validate()?;
    input.owner.validate()?;

    let subdomain = tenancy::normalize_subdomain(&input.organization.subdomain);
    tenancy::validate_subdomain(&subdomain).map_err(AppError::Core)?;

    let created = OrganizationRepo::create(&state.pool, &input.organization, &subdomain).await?;

    // The owner consumes the first seat through the same guarded path as
    // every later user; the returned row carries the updated seat count.
    let org = OrganizationRepo::try_acquire_seat(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("No available seats".into())))?;

    let password_hash = hash_password(&input.owner.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let owner = UserRepo::create(
        &state.pool,
        org.id,
        &input.owner.email,
        &input.owner.name,
        &password_hash,
        OrgRole::OrgOwner.as_str(),
        input.owner.department.as_deref(),
    )
    .await?;

    tracing::info!(org_id = org.id, owner_id = owner.id, subdomain = %org.subdomain, "Organization created");

    Ok(SignupResponse {
        organization: org,
        owner: owner.into(),
    })
}

/// GET /api/v1/organizations/{org_id}
pub async fn get_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_permission(&state, &auth, Permission::OrgView, org_id).await?;

    let org = OrganizationRepo::find_by_id(&state.pool, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Organization",
                id: org_id,
            })
        })?;

    Ok(Json(DataResponse { data: org }))
}

/// PATCH /api/v1/organizations/{org_id}
pub async fn update_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<impl IntoResponse> {
    require_permission(&state, &auth, Permission::OrgUpdate, org_id).await?;

    let details = json!({"fields": &input});
    let result = async {
        input.validate()?;
        OrganizationRepo::update(&state.pool, org_id, &input)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Organization",
                    id: org_id,
                })
            })
    }
    .await;

    let org = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "organization",
        details,
        result,
        |o: &Organization| Some(o.id),
    )
    .await?;

    Ok(Json(DataResponse { data: org }))
}

/// Status transition body for suspend/reactivate/delete endpoints.
#[derive(Debug, Deserialize)]
pub struct OrgStatusRequest {
    pub status: String,
}

/// POST /api/v1/organizations/{org_id}/status
///
/// Suspend, reactivate, or soft-delete the organization. Transitions are
/// validated against the tenancy state machine. Suspension does not cascade
/// to users; it freezes seat accounting by refusing new members.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<DbId>,
    Json(input): Json<OrgStatusRequest>,
) -> AppResult<impl IntoResponse> {
    // Soft deletion is reserved for the owner; suspension is an admin action.
    let needed = if input.status == "deleted" {
        Permission::OrgDelete
    } else {
        Permission::OrgUpdate
    };
    require_permission(&state, &auth, needed, org_id).await?;

    let details = json!({"status": &input.status});
    let result = async {
        let to = OrgStatus::from_str(&input.status)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

        let org = OrganizationRepo::find_by_id(&state.pool, org_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Organization",
                    id: org_id,
                })
            })?;

        let from = OrgStatus::from_str(&org.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        tenancy::validate_transition(from, to).map_err(AppError::Core)?;

        OrganizationRepo::set_status(&state.pool, org_id, to.as_str())
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "Organization",
                    id: org_id,
                })
            })
    }
    .await;

    let org = audit::finish(
        &state,
        Some(&auth),
        actions::STATUS_CHANGE,
        "organization",
        details,
        result,
        |o: &Organization| Some(o.id),
    )
    .await?;

    if org.status == "suspended" {
        state.event_bus.publish(
            PlatformEvent::new(event_types::ORGANIZATION_SUSPENDED)
                .with_org(org.id)
                .with_source("organization", org.id)
                .with_actor(auth.user_id),
        );
    }

    Ok(Json(DataResponse { data: org }))
}
