//! Vendor assessment lifecycle state machine (PRD-06).
//!
//! Assessments move strictly forward through
//! `NotStarted -> Draft -> InProgress -> PendingReview -> Completed ->
//! Approved`; `Rejected` and `Expired` are terminal off-path exits. There is
//! no backward transition. Completing an assessment is the point where the
//! vendor's residual risk score is recomputed, synchronously (see
//! `scoring::residual_vendor_score`).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Assessment type
// ---------------------------------------------------------------------------

/// Why an assessment cycle exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Initial,
    Annual,
    Interim,
    Continuous,
    /// Created automatically by the continuous monitoring service.
    TriggeredReassessment,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Initial => "initial",
            AssessmentType::Annual => "annual",
            AssessmentType::Interim => "interim",
            AssessmentType::Continuous => "continuous",
            AssessmentType::TriggeredReassessment => "triggered_reassessment",
        }
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(AssessmentType::Initial),
            "annual" => Ok(AssessmentType::Annual),
            "interim" => Ok(AssessmentType::Interim),
            "continuous" => Ok(AssessmentType::Continuous),
            "triggered_reassessment" => Ok(AssessmentType::TriggeredReassessment),
            other => Err(format!("Unknown assessment type '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

/// Assessment lifecycle status.
///
/// `NotStarted` is the entry state for monitoring-triggered reassessments;
/// manually created assessments enter at `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotStarted,
    Draft,
    InProgress,
    PendingReview,
    Completed,
    Approved,
    Rejected,
    Expired,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::NotStarted => "not_started",
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::PendingReview => "pending_review",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Approved => "approved",
            AssessmentStatus::Rejected => "rejected",
            AssessmentStatus::Expired => "expired",
        }
    }

    /// Whether the assessment can still move (i.e. is not in a terminal state).
    pub fn is_open(&self) -> bool {
        !matches!(
            self,
            AssessmentStatus::Approved | AssessmentStatus::Rejected | AssessmentStatus::Expired
        )
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(AssessmentStatus::NotStarted),
            "draft" => Ok(AssessmentStatus::Draft),
            "in_progress" => Ok(AssessmentStatus::InProgress),
            "pending_review" => Ok(AssessmentStatus::PendingReview),
            "completed" => Ok(AssessmentStatus::Completed),
            "approved" => Ok(AssessmentStatus::Approved),
            "rejected" => Ok(AssessmentStatus::Rejected),
            "expired" => Ok(AssessmentStatus::Expired),
            other => Err(format!("Unknown assessment status '{other}'")),
        }
    }
}

/// Returns the valid target statuses reachable from `from`.
///
/// Every non-terminal state may expire; `Rejected` is reachable once the
/// assessment is under review. `Approved`, `Rejected`, and `Expired` are
/// terminal.
pub fn valid_transitions(from: AssessmentStatus) -> &'static [AssessmentStatus] {
    match from {
        AssessmentStatus::NotStarted => &[
            AssessmentStatus::Draft,
            AssessmentStatus::InProgress,
            AssessmentStatus::Expired,
        ],
        AssessmentStatus::Draft => &[AssessmentStatus::InProgress, AssessmentStatus::Expired],
        AssessmentStatus::InProgress => {
            &[AssessmentStatus::PendingReview, AssessmentStatus::Expired]
        }
        AssessmentStatus::PendingReview => &[
            AssessmentStatus::Completed,
            AssessmentStatus::Rejected,
            AssessmentStatus::Expired,
        ],
        AssessmentStatus::Completed => &[AssessmentStatus::Approved, AssessmentStatus::Rejected],
        AssessmentStatus::Approved | AssessmentStatus::Rejected | AssessmentStatus::Expired => &[],
    }
}

/// Validate a status transition, returning a descriptive error when invalid.
pub fn validate_transition(
    from: AssessmentStatus,
    to: AssessmentStatus,
) -> Result<(), CoreError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid assessment status transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Validate an overall assessment score (0-100 inclusive).
pub fn validate_overall_score(score: f64) -> Result<(), CoreError> {
    if !(0.0..=100.0).contains(&score) {
        return Err(CoreError::Validation(format!(
            "Assessment score must be between 0 and 100, got {score}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_valid() {
        assert!(validate_transition(AssessmentStatus::NotStarted, AssessmentStatus::Draft).is_ok());
        assert!(validate_transition(AssessmentStatus::Draft, AssessmentStatus::InProgress).is_ok());
        assert!(validate_transition(
            AssessmentStatus::InProgress,
            AssessmentStatus::PendingReview
        )
        .is_ok());
        assert!(validate_transition(
            AssessmentStatus::PendingReview,
            AssessmentStatus::Completed
        )
        .is_ok());
        assert!(
            validate_transition(AssessmentStatus::Completed, AssessmentStatus::Approved).is_ok()
        );
    }

    #[test]
    fn triggered_reassessment_can_skip_draft() {
        assert!(validate_transition(
            AssessmentStatus::NotStarted,
            AssessmentStatus::InProgress
        )
        .is_ok());
    }

    #[test]
    fn no_backward_transitions() {
        assert!(validate_transition(AssessmentStatus::InProgress, AssessmentStatus::Draft).is_err());
        assert!(validate_transition(
            AssessmentStatus::Completed,
            AssessmentStatus::PendingReview
        )
        .is_err());
        assert!(
            validate_transition(AssessmentStatus::Approved, AssessmentStatus::Completed).is_err()
        );
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(valid_transitions(AssessmentStatus::Approved).is_empty());
        assert!(valid_transitions(AssessmentStatus::Rejected).is_empty());
        assert!(valid_transitions(AssessmentStatus::Expired).is_empty());
    }

    #[test]
    fn rejection_only_from_review_onwards() {
        assert!(validate_transition(AssessmentStatus::Draft, AssessmentStatus::Rejected).is_err());
        assert!(validate_transition(
            AssessmentStatus::PendingReview,
            AssessmentStatus::Rejected
        )
        .is_ok());
        assert!(
            validate_transition(AssessmentStatus::Completed, AssessmentStatus::Rejected).is_ok()
        );
    }

    #[test]
    fn open_states_reported_correctly() {
        assert!(AssessmentStatus::NotStarted.is_open());
        assert!(AssessmentStatus::PendingReview.is_open());
        assert!(!AssessmentStatus::Approved.is_open());
        assert!(!AssessmentStatus::Expired.is_open());
    }

    #[test]
    fn score_bounds_enforced() {
        assert!(validate_overall_score(0.0).is_ok());
        assert!(validate_overall_score(100.0).is_ok());
        assert!(validate_overall_score(-0.1).is_err());
        assert!(validate_overall_score(100.1).is_err());
    }
}
