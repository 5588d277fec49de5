//! Vendor tiering and status lifecycle (PRD-05).
//!
//! The tier is an ordinal criticality rating that drives continuous
//! monitoring cadence; status models the onboarding-to-offboarding
//! lifecycle. Tier and status are independently mutable.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Vendor criticality tier. Ordered `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorTier {
    Critical,
    High,
    Medium,
    Low,
}

impl VendorTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorTier::Critical => "critical",
            VendorTier::High => "high",
            VendorTier::Medium => "medium",
            VendorTier::Low => "low",
        }
    }

    /// Continuous monitoring check interval in days.
    ///
    /// Critical vendors are checked daily, High weekly, Medium monthly,
    /// Low quarterly. Used for sweep scheduling, not enforced as an SLA.
    pub fn check_interval_days(&self) -> i64 {
        match self {
            VendorTier::Critical => 1,
            VendorTier::High => 7,
            VendorTier::Medium => 30,
            VendorTier::Low => 90,
        }
    }
}

impl std::str::FromStr for VendorTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(VendorTier::Critical),
            "high" => Ok(VendorTier::High),
            "medium" => Ok(VendorTier::Medium),
            "low" => Ok(VendorTier::Low),
            other => Err(format!("Unknown vendor tier '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

/// Vendor relationship status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    PendingOnboarding,
    Active,
    UnderReview,
    Suspended,
    Terminated,
    Offboarded,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::PendingOnboarding => "pending_onboarding",
            VendorStatus::Active => "active",
            VendorStatus::UnderReview => "under_review",
            VendorStatus::Suspended => "suspended",
            VendorStatus::Terminated => "terminated",
            VendorStatus::Offboarded => "offboarded",
        }
    }

    /// Whether the vendor is in scope for continuous monitoring sweeps.
    pub fn is_monitored(&self) -> bool {
        matches!(
            self,
            VendorStatus::Active | VendorStatus::UnderReview | VendorStatus::Suspended
        )
    }
}

impl std::str::FromStr for VendorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_onboarding" => Ok(VendorStatus::PendingOnboarding),
            "active" => Ok(VendorStatus::Active),
            "under_review" => Ok(VendorStatus::UnderReview),
            "suspended" => Ok(VendorStatus::Suspended),
            "terminated" => Ok(VendorStatus::Terminated),
            "offboarded" => Ok(VendorStatus::Offboarded),
            other => Err(format!("Unknown vendor status '{other}'")),
        }
    }
}

/// Returns the valid target statuses reachable from `from`.
///
/// `Offboarded` is terminal; a terminated vendor can only complete
/// offboarding.
pub fn valid_transitions(from: VendorStatus) -> &'static [VendorStatus] {
    match from {
        VendorStatus::PendingOnboarding => &[VendorStatus::Active, VendorStatus::Terminated],
        VendorStatus::Active => &[
            VendorStatus::UnderReview,
            VendorStatus::Suspended,
            VendorStatus::Terminated,
        ],
        VendorStatus::UnderReview => &[
            VendorStatus::Active,
            VendorStatus::Suspended,
            VendorStatus::Terminated,
        ],
        VendorStatus::Suspended => &[VendorStatus::Active, VendorStatus::Terminated],
        VendorStatus::Terminated => &[VendorStatus::Offboarded],
        VendorStatus::Offboarded => &[],
    }
}

/// Validate a status transition, returning a descriptive error when invalid.
pub fn validate_transition(from: VendorStatus, to: VendorStatus) -> Result<(), CoreError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid vendor status transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering_is_critical_first() {
        assert!(VendorTier::Critical < VendorTier::High);
        assert!(VendorTier::High < VendorTier::Medium);
        assert!(VendorTier::Medium < VendorTier::Low);
    }

    #[test]
    fn check_intervals_by_tier() {
        assert_eq!(VendorTier::Critical.check_interval_days(), 1);
        assert_eq!(VendorTier::High.check_interval_days(), 7);
        assert_eq!(VendorTier::Medium.check_interval_days(), 30);
        assert_eq!(VendorTier::Low.check_interval_days(), 90);
    }

    #[test]
    fn onboarding_can_activate() {
        assert!(validate_transition(VendorStatus::PendingOnboarding, VendorStatus::Active).is_ok());
    }

    #[test]
    fn active_can_enter_review() {
        assert!(validate_transition(VendorStatus::Active, VendorStatus::UnderReview).is_ok());
    }

    #[test]
    fn terminated_can_only_offboard() {
        assert_eq!(
            valid_transitions(VendorStatus::Terminated),
            &[VendorStatus::Offboarded]
        );
    }

    #[test]
    fn offboarded_is_terminal() {
        assert!(valid_transitions(VendorStatus::Offboarded).is_empty());
    }

    #[test]
    fn offboarded_cannot_reactivate() {
        assert!(validate_transition(VendorStatus::Offboarded, VendorStatus::Active).is_err());
    }

    #[test]
    fn terminated_vendor_not_monitored() {
        assert!(!VendorStatus::Terminated.is_monitored());
        assert!(!VendorStatus::Offboarded.is_monitored());
        assert!(VendorStatus::Active.is_monitored());
    }
}
