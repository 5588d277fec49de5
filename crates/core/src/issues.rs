//! Vendor issue (finding) lifecycle (PRD-09).
//!
//! Issues track findings against a vendor, raised manually or by the
//! continuous monitoring service. Remediation follows
//! `Open -> InRemediation -> PendingVerification -> (Resolved | AcceptedRisk)
//! -> Closed`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Severity / priority
// ---------------------------------------------------------------------------

/// Issue severity. Ordered `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Critical => "critical",
            IssueSeverity::High => "high",
            IssueSeverity::Medium => "medium",
            IssueSeverity::Low => "low",
        }
    }
}

impl std::str::FromStr for IssueSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(IssueSeverity::Critical),
            "high" => Ok(IssueSeverity::High),
            "medium" => Ok(IssueSeverity::Medium),
            "low" => Ok(IssueSeverity::Low),
            other => Err(format!("Unknown issue severity '{other}'")),
        }
    }
}

/// Remediation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuePriority::Urgent => "urgent",
            IssuePriority::High => "high",
            IssuePriority::Medium => "medium",
            IssuePriority::Low => "low",
        }
    }
}

impl std::str::FromStr for IssuePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(IssuePriority::Urgent),
            "high" => Ok(IssuePriority::High),
            "medium" => Ok(IssuePriority::Medium),
            "low" => Ok(IssuePriority::Low),
            other => Err(format!("Unknown issue priority '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Source / category
// ---------------------------------------------------------------------------

/// How the issue was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Manual,
    ContinuousMonitoring,
}

impl IssueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSource::Manual => "manual",
            IssueSource::ContinuousMonitoring => "continuous_monitoring",
        }
    }
}

impl std::str::FromStr for IssueSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(IssueSource::Manual),
            "continuous_monitoring" => Ok(IssueSource::ContinuousMonitoring),
            other => Err(format!("Unknown issue source '{other}'")),
        }
    }
}

/// What kind of finding this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    SecurityVulnerability,
    DataBreach,
    ComplianceGap,
    ReputationalRisk,
    FinancialConcern,
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::SecurityVulnerability => "security_vulnerability",
            IssueCategory::DataBreach => "data_breach",
            IssueCategory::ComplianceGap => "compliance_gap",
            IssueCategory::ReputationalRisk => "reputational_risk",
            IssueCategory::FinancialConcern => "financial_concern",
            IssueCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for IssueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security_vulnerability" => Ok(IssueCategory::SecurityVulnerability),
            "data_breach" => Ok(IssueCategory::DataBreach),
            "compliance_gap" => Ok(IssueCategory::ComplianceGap),
            "reputational_risk" => Ok(IssueCategory::ReputationalRisk),
            "financial_concern" => Ok(IssueCategory::FinancialConcern),
            "other" => Ok(IssueCategory::Other),
            other => Err(format!("Unknown issue category '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

/// Issue remediation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InRemediation,
    PendingVerification,
    Resolved,
    AcceptedRisk,
    Closed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InRemediation => "in_remediation",
            IssueStatus::PendingVerification => "pending_verification",
            IssueStatus::Resolved => "resolved",
            IssueStatus::AcceptedRisk => "accepted_risk",
            IssueStatus::Closed => "closed",
        }
    }

    /// Whether the issue still counts against the vendor's residual risk.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            IssueStatus::Open | IssueStatus::InRemediation | IssueStatus::PendingVerification
        )
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueStatus::Open),
            "in_remediation" => Ok(IssueStatus::InRemediation),
            "pending_verification" => Ok(IssueStatus::PendingVerification),
            "resolved" => Ok(IssueStatus::Resolved),
            "accepted_risk" => Ok(IssueStatus::AcceptedRisk),
            "closed" => Ok(IssueStatus::Closed),
            other => Err(format!("Unknown issue status '{other}'")),
        }
    }
}

/// Returns the valid target statuses reachable from `from`.
///
/// Risk acceptance is possible at any open stage; verification can bounce
/// back to remediation when the fix did not hold. `Closed` is terminal.
pub fn valid_transitions(from: IssueStatus) -> &'static [IssueStatus] {
    match from {
        IssueStatus::Open => &[IssueStatus::InRemediation, IssueStatus::AcceptedRisk],
        IssueStatus::InRemediation => &[
            IssueStatus::PendingVerification,
            IssueStatus::AcceptedRisk,
        ],
        IssueStatus::PendingVerification => &[
            IssueStatus::Resolved,
            IssueStatus::InRemediation,
            IssueStatus::AcceptedRisk,
        ],
        IssueStatus::Resolved => &[IssueStatus::Closed],
        IssueStatus::AcceptedRisk => &[IssueStatus::Closed],
        IssueStatus::Closed => &[],
    }
}

/// Validate a status transition, returning a descriptive error when invalid.
pub fn validate_transition(from: IssueStatus, to: IssueStatus) -> Result<(), CoreError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid issue status transition: {} -> {}",
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
    fn severity_orders_critical_first() {
        assert!(IssueSeverity::Critical < IssueSeverity::High);
        assert!(IssueSeverity::High < IssueSeverity::Medium);
        assert!(IssueSeverity::Medium < IssueSeverity::Low);
    }

    #[test]
    fn remediation_path_is_valid() {
        assert!(validate_transition(IssueStatus::Open, IssueStatus::InRemediation).is_ok());
        assert!(
            validate_transition(IssueStatus::InRemediation, IssueStatus::PendingVerification)
                .is_ok()
        );
        assert!(
            validate_transition(IssueStatus::PendingVerification, IssueStatus::Resolved).is_ok()
        );
        assert!(validate_transition(IssueStatus::Resolved, IssueStatus::Closed).is_ok());
    }

    #[test]
    fn verification_can_bounce_back() {
        assert!(
            validate_transition(IssueStatus::PendingVerification, IssueStatus::InRemediation)
                .is_ok()
        );
    }

    #[test]
    fn risk_acceptance_from_any_open_stage() {
        assert!(validate_transition(IssueStatus::Open, IssueStatus::AcceptedRisk).is_ok());
        assert!(validate_transition(IssueStatus::InRemediation, IssueStatus::AcceptedRisk).is_ok());
        assert!(
            validate_transition(IssueStatus::PendingVerification, IssueStatus::AcceptedRisk)
                .is_ok()
        );
    }

    #[test]
    fn closed_is_terminal() {
        assert!(valid_transitions(IssueStatus::Closed).is_empty());
    }

    #[test]
    fn open_cannot_jump_to_resolved() {
        assert!(validate_transition(IssueStatus::Open, IssueStatus::Resolved).is_err());
    }

    #[test]
    fn open_statuses_counted() {
        assert!(IssueStatus::Open.is_open());
        assert!(IssueStatus::InRemediation.is_open());
        assert!(IssueStatus::PendingVerification.is_open());
        assert!(!IssueStatus::Resolved.is_open());
        assert!(!IssueStatus::AcceptedRisk.is_open());
        assert!(!IssueStatus::Closed.is_open());
    }
}
