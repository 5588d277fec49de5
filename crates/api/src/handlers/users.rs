//! Handlers for user management and the invitation lifecycle.
//!
//! Seat accounting rules: creating a user (directly or by accepting an
//! invitation) claims a seat through a guarded atomic update, and
//! deactivating a user releases one (clamped at zero). Organizations that
//! are suspended or deleted refuse new members.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::str::FromStr;
use validator::Validate;

use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::invitations;
use veriguard_core::permissions::{OrgRole, Permission};
use veriguard_core::tenancy::OrgStatus;
use veriguard_core::types::DbId;
use veriguard_db::models::invitation::{AcceptInvitation, CreateInvitation, Invitation};
use veriguard_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use veriguard_db::repositories::{InvitationRepo, JobRepo, OrganizationRepo, UserRepo};
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Verify the organization exists and accepts new members, returning a
/// Conflict otherwise. Suspension freezes seat accounting.
async fn ensure_accepts_members(state: &AppState, org_id: DbId) -> AppResult<()> {
    let org = OrganizationRepo::find_by_id(&state.pool, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Organization",
                id: org_id,
            })
        })?;
    let status =
        OrgStatus::from_str(&org.status).map_err(|e| AppError::Core(CoreError::Internal(e)))?;
    if !status.accepts_new_members() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Organization is {} and cannot take new members",
            org.status
        ))));
    }
    Ok(())
}

/// Claim a seat, run `create`, and release the seat again if the creation
/// fails (duplicate email, etc.). Keeps `used_seats <= seats` without a
/// cross-repository transaction.
async fn create_with_seat(
    state: &AppState,
    org_id: DbId,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
    department: Option<&str>,
) -> AppResult<User> {
    let role_parsed =
        OrgRole::from_str(role).map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    OrganizationRepo::try_acquire_seat(&state.pool, org_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("No available seats".into())))?;

    let password_hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let created = UserRepo::create(
        &state.pool,
        org_id,
        email,
        name,
        &password_hash,
        role_parsed.as_str(),
        department,
    )
    .await;

    match created {
        Ok(user) => Ok(user),
        Err(e) => {
            OrganizationRepo::release_seat(&state.pool, org_id).await?;
            Err(e.into())
        }
    }
}

/// POST /api/v1/users
pub async fn create_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserCreate, org_id).await?;

    let details = json!({"email": &input.email, "role": &input.role});
    let result = async {
        input.validate()?;
        ensure_accepts_members(&state, org_id).await?;
        create_with_seat(
            &state,
            org_id,
            &input.email,
            &input.name,
            &input.password,
            &input.role,
            input.department.as_deref(),
        )
        .await
    }
    .await;

    let user = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "user",
        details,
        result,
        |u: &User| Some(u.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::USER_CREATED)
            .with_org(org_id)
            .with_source("user", user.id)
            .with_actor(auth.user_id),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// GET /api/v1/users
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserView, org_id).await?;

    let users = UserRepo::list_for_org(
        &state.pool,
        org_id,
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{user_id}
pub async fn get_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserView, org_id).await?;

    let user = UserRepo::find_scoped(&state.pool, user_id, org_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })
        })?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PATCH /api/v1/users/{user_id}
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserUpdate, org_id).await?;

    let details = json!({"fields": &input});
    let result = async {
        if let Some(role) = &input.role {
            OrgRole::from_str(role).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        }
        UserRepo::update(&state.pool, user_id, org_id, &input)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "User",
                    id: user_id,
                })
            })
    }
    .await;

    let user = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "user",
        details,
        result,
        |u: &User| Some(u.id),
    )
    .await?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /api/v1/users/{user_id}
///
/// Soft delete: the user becomes inactive and their seat is released.
pub async fn deactivate_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserDelete, org_id).await?;

    let details = json!({"user_id": user_id});
    let result = async {
        let changed = UserRepo::deactivate(&state.pool, user_id, org_id).await?;
        if !changed {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }));
        }
        OrganizationRepo::release_seat(&state.pool, org_id).await?;
        Ok(user_id)
    }
    .await;

    audit::finish(
        &state,
        Some(&auth),
        actions::DELETE,
        "user",
        details,
        result,
        |id: &DbId| Some(*id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

/// POST /api/v1/invitations
///
/// Invite a user by email. Fails when no seats are available (the seat is
/// not claimed yet -- acceptance claims it -- but inviting into a full
/// organization is refused up front). Email delivery is queued,
/// fire-and-forget.
pub async fn invite_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateInvitation>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserInvite, org_id).await?;

    let details = json!({"email": &input.email, "role": &input.role});
    let result = async {
        input.validate()?;
        OrgRole::from_str(&input.role)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
        ensure_accepts_members(&state, org_id).await?;

        if !OrganizationRepo::has_available_seats(&state.pool, org_id).await? {
            return Err(AppError::Core(CoreError::Conflict(
                "No available seats".into(),
            )));
        }

        let token = invitations::generate_token();
        let now = chrono::Utc::now();
        let invitation = InvitationRepo::create(
            &state.pool,
            org_id,
            &input.email,
            &input.role,
            &token,
            Some(auth.user_id),
            invitations::expiry_for(now),
        )
        .await?;

        // Queue the email; the worker delivers it. Deduped per invitation.
        JobRepo::enqueue(
            &state.pool,
            veriguard_db::models::job::job_type::SEND_INVITATION_EMAIL,
            &json!({"invitation_id": invitation.id}),
            Some(&format!("invitation-email-{}", invitation.id)),
        )
        .await?;

        Ok(invitation)
    }
    .await;

    let invitation = audit::finish(
        &state,
        Some(&auth),
        actions::INVITE,
        "invitation",
        details,
        result,
        |i: &Invitation| Some(i.id),
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::USER_INVITED)
            .with_org(org_id)
            .with_source("invitation", invitation.id)
            .with_actor(auth.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: invitation })))
}

/// GET /api/v1/invitations
pub async fn list_invitations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::UserView, org_id).await?;

    let invitations = InvitationRepo::list_for_org(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: invitations }))
}

/// POST /api/v1/invitations/accept
///
/// Public endpoint: consume an invitation token and create the account.
/// Fails when the token is unknown, already used, or expired; the
/// `status = 'pending'` guard in `mark_accepted` makes consumption
/// single-use even under races. User creation re-runs the seat and email
/// uniqueness checks.
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(input): Json<AcceptInvitation>,
) -> AppResult<impl IntoResponse> {
    let details = json!({"token": &input.token});
    let result = async {
        input.validate()?;

        let invitation = InvitationRepo::find_by_token(&state.pool, &input.token)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Invalid invitation token".into()))
            })?;

        let status = invitations::InvitationStatus::from_str(&invitation.status)
            .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
        if !invitations::is_consumable(status, invitation.created_at, chrono::Utc::now()) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invitation is no longer valid".into(),
            )));
        }

        ensure_accepts_members(&state, invitation.organization_id).await?;

        // Claim the token before creating the account; a concurrent accept
        // of the same token loses here.
        InvitationRepo::mark_accepted(&state.pool, invitation.id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invitation is no longer valid".into(),
                ))
            })?;

        let created = create_with_seat(
            &state,
            invitation.organization_id,
            &invitation.email,
            &input.name,
            &input.password,
            &invitation.role,
            input.department.as_deref(),
        )
        .await;

        let user = match created {
            Ok(user) => user,
            Err(e) => {
                // The seat/uniqueness checks failed after the token was
                // claimed; reopen it so the invitee can retry once the
                // organization has room again.
                InvitationRepo::reopen(&state.pool, invitation.id).await?;
                return Err(e);
            }
        };

        tracing::info!(
            user_id = user.id,
            org_id = invitation.organization_id,
            invitation_id = invitation.id,
            "Invitation accepted"
        );
        Ok(user)
    }
    .await;

    let user = audit::finish(
        &state,
        None,
        actions::ACCEPT_INVITATION,
        "user",
        details,
        result,
        |u: &User| Some(u.id),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}
