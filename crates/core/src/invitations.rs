//! Invitation token generation and expiry rules (PRD-04).
//!
//! Invitations are single-use: `pending -> accepted` on consumption, or
//! `pending -> expired` once the 7-day window lapses. A consumed or expired
//! token can never create a user.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Invitation validity window in days.
pub const INVITATION_EXPIRY_DAYS: i64 = 7;

/// Length of the generated invitation token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 40;

/// Lifecycle status of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            other => Err(format!("Unknown invitation status '{other}'")),
        }
    }
}

/// Generate a random invitation token.
///
/// The token is the credential itself and is emailed to the invitee; only
/// its value (not a hash) is stored, matching its short life and single use.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the expiry instant for an invitation created at `created_at`.
pub fn expiry_for(created_at: Timestamp) -> Timestamp {
    created_at + Duration::days(INVITATION_EXPIRY_DAYS)
}

/// Whether an invitation created at `created_at` is expired as of `now`.
pub fn is_expired(created_at: Timestamp, now: Timestamp) -> bool {
    now >= expiry_for(created_at)
}

/// Whether an invitation in `status`, created at `created_at`, may still be
/// consumed at `now`.
pub fn is_consumable(status: InvitationStatus, created_at: Timestamp, now: Timestamp) -> bool {
    status == InvitationStatus::Pending && !is_expired(created_at, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn token_has_expected_length_and_charset() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn fresh_invitation_is_consumable() {
        let now = Utc::now();
        assert!(is_consumable(InvitationStatus::Pending, now, now));
    }

    #[test]
    fn expires_after_seven_days() {
        let created = Utc::now();
        let just_before = created + Duration::days(7) - Duration::seconds(1);
        let at_boundary = created + Duration::days(7);

        assert!(!is_expired(created, just_before));
        assert!(is_expired(created, at_boundary));
    }

    #[test]
    fn accepted_invitation_not_consumable() {
        let now = Utc::now();
        assert!(!is_consumable(InvitationStatus::Accepted, now, now));
    }

    #[test]
    fn expired_status_not_consumable() {
        let now = Utc::now();
        assert!(!is_consumable(InvitationStatus::Expired, now, now));
    }

    #[test]
    fn pending_but_lapsed_not_consumable() {
        let created = Utc::now() - Duration::days(8);
        assert!(!is_consumable(InvitationStatus::Pending, created, Utc::now()));
    }
}
