//! Organization (tenant) lifecycle and seat accounting rules (PRD-02).
//!
//! Status transitions and seat arithmetic are pure functions here; the
//! atomic SQL guards live in the organization repository.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgStatus {
    Active,
    Trial,
    Suspended,
    Deleted,
}

impl OrgStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgStatus::Active => "active",
            OrgStatus::Trial => "trial",
            OrgStatus::Suspended => "suspended",
            OrgStatus::Deleted => "deleted",
        }
    }

    /// Whether members may be added (directly or via invitation).
    ///
    /// Suspension freezes seat accounting: no new users or invitations
    /// until the organization is reactivated. Existing sessions live out
    /// their JWT expiry; suspension never cascades to user records.
    pub fn accepts_new_members(&self) -> bool {
        matches!(self, OrgStatus::Active | OrgStatus::Trial)
    }
}

impl std::str::FromStr for OrgStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrgStatus::Active),
            "trial" => Ok(OrgStatus::Trial),
            "suspended" => Ok(OrgStatus::Suspended),
            "deleted" => Ok(OrgStatus::Deleted),
            other => Err(format!("Unknown organization status '{other}'")),
        }
    }
}

/// Returns the valid target statuses reachable from `from`.
///
/// `Deleted` is terminal. Trial organizations activate on subscription or
/// get suspended; suspension is reversible to `Active` only.
pub fn valid_transitions(from: OrgStatus) -> &'static [OrgStatus] {
    match from {
        OrgStatus::Trial => &[OrgStatus::Active, OrgStatus::Suspended, OrgStatus::Deleted],
        OrgStatus::Active => &[OrgStatus::Suspended, OrgStatus::Deleted],
        OrgStatus::Suspended => &[OrgStatus::Active, OrgStatus::Deleted],
        OrgStatus::Deleted => &[],
    }
}

/// Validate a status transition, returning a descriptive error when invalid.
pub fn validate_transition(from: OrgStatus, to: OrgStatus) -> Result<(), CoreError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid organization status transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

// ---------------------------------------------------------------------------
// Seat accounting
// ---------------------------------------------------------------------------

/// Whether an organization with `used_seats` of `seats` can take one more.
pub fn has_available_seats(used_seats: i32, seats: i32) -> bool {
    used_seats < seats
}

/// Seat count after releasing one seat. Never goes below zero.
pub fn released_seat_count(used_seats: i32) -> i32 {
    (used_seats - 1).max(0)
}

// ---------------------------------------------------------------------------
// Subdomain rules
// ---------------------------------------------------------------------------

/// Minimum subdomain length.
pub const SUBDOMAIN_MIN_LENGTH: usize = 3;

/// Maximum subdomain length (DNS label limit).
pub const SUBDOMAIN_MAX_LENGTH: usize = 63;

/// Normalize a subdomain for storage and comparison.
///
/// Subdomains are case-insensitive; the lowercased form is what the unique
/// index sees, so `Acme` and `acme` collide.
pub fn normalize_subdomain(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Validate a normalized subdomain.
///
/// Accepts lowercase alphanumerics and interior hyphens, 3 to 63 characters.
/// The subdomain is immutable after creation, so this runs only at signup.
pub fn validate_subdomain(subdomain: &str) -> Result<(), CoreError> {
    if subdomain.len() < SUBDOMAIN_MIN_LENGTH || subdomain.len() > SUBDOMAIN_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Subdomain must be between {SUBDOMAIN_MIN_LENGTH} and {SUBDOMAIN_MAX_LENGTH} characters"
        )));
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err(CoreError::Validation(
            "Subdomain must not start or end with a hyphen".to_string(),
        ));
    }
    if !subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Subdomain may only contain lowercase letters, digits, and hyphens".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Status transitions ------------------------------------------------

    #[test]
    fn trial_can_activate() {
        assert!(validate_transition(OrgStatus::Trial, OrgStatus::Active).is_ok());
    }

    #[test]
    fn active_can_suspend() {
        assert!(validate_transition(OrgStatus::Active, OrgStatus::Suspended).is_ok());
    }

    #[test]
    fn suspended_can_reactivate() {
        assert!(validate_transition(OrgStatus::Suspended, OrgStatus::Active).is_ok());
    }

    #[test]
    fn deleted_is_terminal() {
        assert!(valid_transitions(OrgStatus::Deleted).is_empty());
    }

    #[test]
    fn suspended_cannot_go_back_to_trial() {
        assert!(validate_transition(OrgStatus::Suspended, OrgStatus::Trial).is_err());
    }

    #[test]
    fn suspended_org_rejects_new_members() {
        assert!(!OrgStatus::Suspended.accepts_new_members());
        assert!(OrgStatus::Active.accepts_new_members());
        assert!(OrgStatus::Trial.accepts_new_members());
    }

    // -- Seat accounting ---------------------------------------------------

    #[test]
    fn seats_available_below_limit() {
        assert!(has_available_seats(4, 5));
    }

    #[test]
    fn seats_exhausted_at_limit() {
        assert!(!has_available_seats(5, 5));
        assert!(!has_available_seats(6, 5));
    }

    #[test]
    fn seat_release_clamps_at_zero() {
        assert_eq!(released_seat_count(1), 0);
        assert_eq!(released_seat_count(0), 0);
        assert_eq!(released_seat_count(5), 4);
    }

    // -- Subdomain rules ---------------------------------------------------

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_subdomain("  AcmeCorp "), "acmecorp");
    }

    #[test]
    fn valid_subdomains_accepted() {
        assert!(validate_subdomain("acme").is_ok());
        assert!(validate_subdomain("acme-corp-2").is_ok());
        assert!(validate_subdomain("abc").is_ok());
    }

    #[test]
    fn short_and_long_subdomains_rejected() {
        assert!(validate_subdomain("ab").is_err());
        assert!(validate_subdomain(&"a".repeat(64)).is_err());
    }

    #[test]
    fn edge_hyphens_rejected() {
        assert!(validate_subdomain("-acme").is_err());
        assert!(validate_subdomain("acme-").is_err());
    }

    #[test]
    fn uppercase_and_symbols_rejected() {
        assert!(validate_subdomain("Acme").is_err());
        assert!(validate_subdomain("ac.me").is_err());
        assert!(validate_subdomain("ac_me").is_err());
    }
}
