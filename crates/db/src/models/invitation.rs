//! Invitation model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use veriguard_core::types::{DbId, Timestamp};

/// Full invitation row from the `invitations` table.
///
/// The token is the bearer credential; it is serialized only in the
/// creation response so the inviter can forward it out-of-band if email
/// delivery fails.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub organization_id: DbId,
    pub email: String,
    pub role: String,
    pub token: String,
    pub status: String,
    pub invited_by: Option<DbId>,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inviting a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvitation {
    #[validate(email)]
    pub email: String,
    pub role: String,
}

/// Request body for accepting an invitation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitation {
    pub token: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 12))]
    pub password: String,
    pub department: Option<String>,
}
