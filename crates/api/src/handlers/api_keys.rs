//! Handlers for API key management.
//!
//! The plaintext key is returned exactly once, in the creation response;
//! only its SHA-256 hash and display prefix are stored.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use validator::Validate;

use veriguard_core::api_keys::{generate_api_key, DEFAULT_RATE_LIMIT};
use veriguard_core::audit::actions;
use veriguard_core::error::CoreError;
use veriguard_core::permissions::Permission;
use veriguard_core::types::DbId;
use veriguard_db::models::api_key::{ApiKeyResponse, CreateApiKey, CreatedApiKey};
use veriguard_db::repositories::ApiKeyRepo;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/api-keys
pub async fn create_api_key(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateApiKey>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ApiKeyCreate, org_id).await?;

    let details = json!({"name": &input.name, "scopes": &input.scopes});
    let result = async {
        input.validate()?;

        let generated = generate_api_key();
        let stored = ApiKeyRepo::create(
            &state.pool,
            org_id,
            &input.name,
            &generated.prefix,
            &generated.hash,
            &input.scopes,
            input.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT),
            input.expires_at,
            Some(auth.user_id),
        )
        .await?;

        Ok(CreatedApiKey {
            key: ApiKeyResponse::from(stored),
            plaintext: generated.plaintext,
        })
    }
    .await;

    let created = audit::finish(
        &state,
        Some(&auth),
        actions::CREATE,
        "api_key",
        details,
        result,
        |k: &CreatedApiKey| Some(k.key.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/api-keys
pub async fn list_api_keys(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ApiKeyView, org_id).await?;

    let keys = ApiKeyRepo::list_for_org(&state.pool, org_id).await?;
    let keys: Vec<ApiKeyResponse> = keys.into_iter().map(ApiKeyResponse::from).collect();
    Ok(Json(DataResponse { data: keys }))
}

/// DELETE /api/v1/api-keys/{key_id}
///
/// Revoke a key. Revocation is permanent; issue a new key instead of
/// reactivating.
pub async fn revoke_api_key(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(key_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::ApiKeyRevoke, org_id).await?;

    let details = json!({"key_id": key_id});
    let result = async {
        let changed = ApiKeyRepo::revoke(&state.pool, key_id, org_id).await?;
        if !changed {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "ApiKey",
                id: key_id,
            }));
        }
        Ok(key_id)
    }
    .await;

    audit::finish(
        &state,
        Some(&auth),
        actions::REVOKE,
        "api_key",
        details,
        result,
        |id: &DbId| Some(*id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
