//! Invitation email delivery.

use veriguard_core::types::DbId;
use veriguard_db::repositories::{InvitationRepo, OrganizationRepo};
use veriguard_db::DbPool;
use veriguard_events::{EmailConfig, EmailDelivery};

/// Send the invitation email for the invitation id in the payload.
///
/// Skips (successfully) when SMTP is not configured or the invitation is
/// no longer pending -- the token remains usable either way, and a retried
/// delivery for an accepted invitation must not resend.
pub async fn run(pool: &DbPool, payload: &serde_json::Value) -> Result<(), String> {
    let invitation_id: DbId = payload
        .get("invitation_id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| "Payload is missing invitation_id".to_string())?;

    let Some(config) = EmailConfig::from_env() else {
        tracing::warn!(invitation_id, "SMTP not configured, skipping invitation email");
        return Ok(());
    };

    let invitation = InvitationRepo::find_by_id(pool, invitation_id)
        .await
        .map_err(|e| format!("Invitation lookup failed: {e}"))?
        .ok_or_else(|| format!("Invitation {invitation_id} not found"))?;

    if invitation.status != "pending" {
        tracing::info!(invitation_id, status = %invitation.status, "Invitation no longer pending, not sending");
        return Ok(());
    }

    let org = OrganizationRepo::find_by_id(pool, invitation.organization_id)
        .await
        .map_err(|e| format!("Organization lookup failed: {e}"))?
        .ok_or_else(|| format!("Organization {} not found", invitation.organization_id))?;

    EmailDelivery::new(config)
        .deliver_invitation(&invitation.email, &org.name, &invitation.token)
        .await
        .map_err(|e| format!("Email delivery failed: {e}"))?;

    tracing::info!(invitation_id, to = %invitation.email, "Invitation email sent");
    Ok(())
}
