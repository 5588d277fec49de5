//! API key model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full API key row from the `api_keys` table.
///
/// Contains the key hash -- never serialize this struct to responses; use
/// [`ApiKeyResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct ApiKey {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub scopes: Vec<String>,
    pub rate_limit: i32,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub last_used_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe API key representation for list/detail responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: DbId,
    pub name: String,
    pub key_prefix: String,
    pub scopes: Vec<String>,
    pub rate_limit: i32,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub last_used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        ApiKeyResponse {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            scopes: key.scopes,
            rate_limit: key.rate_limit,
            is_active: key.is_active,
            expires_at: key.expires_at,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

/// DTO for creating an API key.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApiKey {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, message = "at least one scope is required"))]
    pub scopes: Vec<String>,
    pub rate_limit: Option<i32>,
    pub expires_at: Option<Timestamp>,
}

/// Creation response carrying the plaintext key exactly once.
#[derive(Debug, Serialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub key: ApiKeyResponse,
    /// Shown only in this response; never stored or returned again.
    pub plaintext: String,
}
