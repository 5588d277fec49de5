//! Permission-matrix authorization checks.
//!
//! [`require_permission`] is called at the top of every protected handler.
//! It resolves the authenticated user fresh from the database (so role
//! changes and deactivation take effect immediately, not at token expiry)
//! and evaluates the core permission matrix, including the cross-tenant
//! refusal: no permission check ever succeeds against another organization,
//! even for a matching user id.

use std::str::FromStr;

use veriguard_core::error::CoreError;
use veriguard_core::permissions::{has_permission, Actor, OrgRole, Permission};
use veriguard_core::types::DbId;
use veriguard_db::repositories::UserRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Ensure `auth` holds `permission` within organization `org_id`.
///
/// Rejects with 403 Forbidden when the user is missing, inactive, belongs
/// to a different organization, or their role lacks the permission.
pub async fn require_permission(
    state: &AppState,
    auth: &AuthUser,
    permission: Permission,
    org_id: DbId,
) -> Result<(), AppError> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id).await?;

    let actor = match &user {
        Some(u) => {
            let role = OrgRole::from_str(&u.role).map_err(|e| {
                tracing::error!(user_id = u.id, error = %e, "User row carries unknown role");
                AppError::Core(CoreError::Internal(e))
            })?;
            Some(Actor {
                organization_id: u.organization_id,
                role,
                is_active: u.is_active(),
            })
        }
        None => None,
    };

    if !has_permission(actor.as_ref(), permission, org_id) {
        tracing::warn!(
            user_id = auth.user_id,
            org_id,
            permission = ?permission,
            "Permission denied"
        );
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        )));
    }

    Ok(())
}
