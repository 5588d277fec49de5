//! Login handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use veriguard_core::audit::{actions, AuditStatus};
use veriguard_core::error::CoreError;
use veriguard_db::models::user::UserResponse;
use veriguard_db::repositories::{OrganizationRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Login request body. The subdomain selects the tenant; emails are only
/// unique within one.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub subdomain: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// POST /api/v1/auth/login
///
/// Authenticate against a tenant and mint an access token. The same
/// "Invalid credentials" answer covers unknown tenant, unknown user, wrong
/// password, and deactivated accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));

    let subdomain = veriguard_core::tenancy::normalize_subdomain(&input.subdomain);
    let org = OrganizationRepo::find_by_subdomain(&state.pool, &subdomain)
        .await?
        .ok_or_else(invalid)?;

    let user = UserRepo::find_by_email(&state.pool, org.id, &input.email)
        .await?
        .ok_or_else(invalid)?;

    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;

    if !password_ok || !user.is_active() {
        crate::audit::record(
            &state,
            None,
            actions::LOGIN,
            "user",
            Some(user.id),
            AuditStatus::Failure,
            json!({"email": &input.email, "organization_id": org.id}),
        )
        .await;
        return Err(invalid());
    }

    let token = generate_access_token(user.id, org.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    UserRepo::record_login(&state.pool, user.id).await?;

    crate::audit::record(
        &state,
        None,
        actions::LOGIN,
        "user",
        Some(user.id),
        AuditStatus::Success,
        json!({"organization_id": org.id}),
    )
    .await;

    tracing::info!(user_id = user.id, org_id = org.id, "User logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token: token,
            user: user.into(),
        },
    }))
}
