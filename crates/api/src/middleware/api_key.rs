//! API-key authentication extractor for the external integration surface.
//!
//! External monitoring connectors authenticate with an `X-Api-Key` header
//! instead of a JWT. Validation fails closed: a missing, unknown, inactive,
//! or expired key is rejected before any scope check runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use veriguard_core::api_keys::{hash_api_key, validate_key_usable, validate_scope};
use veriguard_core::error::CoreError;
use veriguard_core::types::DbId;
use veriguard_db::repositories::ApiKeyRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the plaintext API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Authenticated API key extracted from the `X-Api-Key` header.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    pub key_id: DbId,
    /// The organization the key belongs to; scopes every operation.
    pub organization_id: DbId,
    pub scopes: Vec<String>,
}

impl ApiKeyAuth {
    /// Check that the key grants `required`, as a 403 otherwise.
    pub fn require_scope(&self, required: &str) -> Result<(), AppError> {
        validate_scope(&self.scopes, required).map_err(AppError::Core)
    }
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-Api-Key header".into()))
            })?;

        let key = ApiKeyRepo::find_by_hash(&state.pool, &hash_api_key(presented))
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown API key".into())))?;

        validate_key_usable(key.is_active, key.expires_at, Utc::now()).map_err(AppError::Core)?;

        ApiKeyRepo::touch_last_used(&state.pool, key.id).await?;

        Ok(ApiKeyAuth {
            key_id: key.id,
            organization_id: key.organization_id,
            scopes: key.scopes,
        })
    }
}
