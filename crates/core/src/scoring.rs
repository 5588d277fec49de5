//! Risk scoring and aggregation (PRD-11).
//!
//! Two scales coexist:
//!
//! - The analyst-facing 5x5 matrix: likelihood (1-5) x impact (1-5) with a
//!   threat-level multiplier, classified on the ISO 31000-style cutoffs
//!   (>= 15 Critical, >= 10 High, >= 5 Medium, else Low). Residual scoring
//!   adjusts likelihood downward by control effectiveness before the same
//!   formula.
//! - The vendor-facing 0-100 residual risk score, recomputed whenever an
//!   assessment completes or an open issue changes: control weakness from
//!   the latest completed assessment plus a penalty per open issue.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::issues::IssueSeverity;
use crate::monitoring::RiskLevel;

// ---------------------------------------------------------------------------
// 5x5 matrix scoring
// ---------------------------------------------------------------------------

/// External threat environment for a risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Score multiplier applied on top of likelihood x impact.
    pub fn multiplier(&self) -> f64 {
        match self {
            ThreatLevel::Low => 0.8,
            ThreatLevel::Medium => 1.0,
            ThreatLevel::High => 1.3,
            ThreatLevel::Critical => 1.5,
        }
    }
}

/// Fraction of likelihood removed by fully effective controls.
const CONTROL_EFFECTIVENESS_WEIGHT: f64 = 0.4;

/// Classification cutoff: scores at or above are Critical.
pub const SCORE_CRITICAL_AT: f64 = 15.0;
/// Classification cutoff: scores at or above are High.
pub const SCORE_HIGH_AT: f64 = 10.0;
/// Classification cutoff: scores at or above are Medium.
pub const SCORE_MEDIUM_AT: f64 = 5.0;

/// A computed matrix score with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    /// Final score on the (multiplier-stretched) 1-25 scale.
    pub score: f64,
    pub classification: RiskLevel,
    /// Remediation ordering: 1 (Critical) through 4 (Low).
    pub priority: i16,
    /// Likelihood after the control-effectiveness adjustment.
    pub adjusted_likelihood: f64,
}

/// Validate a likelihood or impact rating (1-5 inclusive).
pub fn validate_rating(name: &str, value: i16) -> Result<(), CoreError> {
    if !(1..=5).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 1 and 5, got {value}"
        )));
    }
    Ok(())
}

/// Score a risk with no control adjustment (inherent risk).
pub fn inherent_score(
    likelihood: i16,
    impact: i16,
    threat: ThreatLevel,
) -> Result<RiskScore, CoreError> {
    scored(likelihood, impact, threat, 0.0)
}

/// Score a risk with controls applied (residual risk).
///
/// `control_effectiveness` is a percentage (0-100) of how well mitigating
/// controls perform; it scales likelihood down by up to 40%.
pub fn residual_score(
    likelihood: i16,
    impact: i16,
    threat: ThreatLevel,
    control_effectiveness: f64,
) -> Result<RiskScore, CoreError> {
    if !(0.0..=100.0).contains(&control_effectiveness) {
        return Err(CoreError::Validation(format!(
            "Control effectiveness must be between 0 and 100, got {control_effectiveness}"
        )));
    }
    scored(likelihood, impact, threat, control_effectiveness / 100.0)
}

fn scored(
    likelihood: i16,
    impact: i16,
    threat: ThreatLevel,
    effectiveness: f64,
) -> Result<RiskScore, CoreError> {
    validate_rating("Likelihood", likelihood)?;
    validate_rating("Impact", impact)?;

    let adjusted_likelihood =
        f64::from(likelihood) * (1.0 - effectiveness * CONTROL_EFFECTIVENESS_WEIGHT);
    let score = adjusted_likelihood * f64::from(impact) * threat.multiplier();

    let (classification, priority) = if score >= SCORE_CRITICAL_AT {
        (RiskLevel::Critical, 1)
    } else if score >= SCORE_HIGH_AT {
        (RiskLevel::High, 2)
    } else if score >= SCORE_MEDIUM_AT {
        (RiskLevel::Medium, 3)
    } else {
        (RiskLevel::Low, 4)
    };

    Ok(RiskScore {
        score,
        classification,
        priority,
        adjusted_likelihood,
    })
}

// ---------------------------------------------------------------------------
// Vendor residual risk (0-100)
// ---------------------------------------------------------------------------

/// Per-open-issue penalty points added to a vendor's residual risk.
pub fn issue_penalty(severity: IssueSeverity) -> f64 {
    match severity {
        IssueSeverity::Critical => 15.0,
        IssueSeverity::High => 8.0,
        IssueSeverity::Medium => 4.0,
        IssueSeverity::Low => 1.0,
    }
}

/// Recompute a vendor's residual risk score (0-100, higher is riskier).
///
/// Base risk is the control weakness from the latest completed assessment
/// (`100 - overall_score`); when no assessment has completed the inherent
/// score stands in. Every open issue adds its severity penalty. The result
/// is clamped to the 0-100 scale.
///
/// Called synchronously on assessment completion and on monitoring signal
/// ingestion, never deferred to a background job.
pub fn residual_vendor_score(
    inherent_risk_score: f64,
    latest_assessment_score: Option<f64>,
    open_issue_severities: &[IssueSeverity],
) -> f64 {
    let base = match latest_assessment_score {
        Some(overall) => 100.0 - overall,
        None => inherent_risk_score,
    };
    let penalty: f64 = open_issue_severities
        .iter()
        .map(|s| issue_penalty(*s))
        .sum();
    (base + penalty).clamp(0.0, 100.0)
}

/// Band a 0-100 residual score for heatmap display.
pub fn residual_band(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::Critical
    } else if score >= 50.0 {
        RiskLevel::High
    } else if score >= 25.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Matrix scoring ----------------------------------------------------

    #[test]
    fn max_inherent_score_is_critical() {
        let s = inherent_score(5, 5, ThreatLevel::Medium).unwrap();
        assert_eq!(s.score, 25.0);
        assert_eq!(s.classification, RiskLevel::Critical);
        assert_eq!(s.priority, 1);
    }

    #[test]
    fn classification_cutoffs() {
        // 3 x 5 = 15 -> Critical (inclusive boundary).
        let s = inherent_score(3, 5, ThreatLevel::Medium).unwrap();
        assert_eq!(s.classification, RiskLevel::Critical);
        // 2 x 5 = 10 -> High.
        let s = inherent_score(2, 5, ThreatLevel::Medium).unwrap();
        assert_eq!(s.classification, RiskLevel::High);
        // 1 x 5 = 5 -> Medium.
        let s = inherent_score(1, 5, ThreatLevel::Medium).unwrap();
        assert_eq!(s.classification, RiskLevel::Medium);
        // 2 x 2 = 4 -> Low.
        let s = inherent_score(2, 2, ThreatLevel::Medium).unwrap();
        assert_eq!(s.classification, RiskLevel::Low);
    }

    #[test]
    fn threat_multiplier_stretches_score() {
        let medium = inherent_score(3, 3, ThreatLevel::Medium).unwrap();
        let critical = inherent_score(3, 3, ThreatLevel::Critical).unwrap();
        let low = inherent_score(3, 3, ThreatLevel::Low).unwrap();
        assert_eq!(medium.score, 9.0);
        assert_eq!(critical.score, 13.5);
        assert!((low.score - 7.2).abs() < 1e-9);
    }

    #[test]
    fn controls_reduce_likelihood() {
        // 75% effective controls cut likelihood by 30% (0.75 * 0.4).
        let s = residual_score(4, 5, ThreatLevel::High, 75.0).unwrap();
        assert!((s.adjusted_likelihood - 2.8).abs() < 1e-9);
        assert!((s.score - 2.8 * 5.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn fully_effective_controls_leave_residual() {
        // Even 100% effectiveness only removes 40% of likelihood.
        let s = residual_score(5, 5, ThreatLevel::Medium, 100.0).unwrap();
        assert!((s.adjusted_likelihood - 3.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_ratings_rejected() {
        assert!(inherent_score(0, 3, ThreatLevel::Medium).is_err());
        assert!(inherent_score(3, 6, ThreatLevel::Medium).is_err());
        assert!(residual_score(3, 3, ThreatLevel::Medium, 101.0).is_err());
        assert!(residual_score(3, 3, ThreatLevel::Medium, -1.0).is_err());
    }

    // -- Vendor residual score ---------------------------------------------

    #[test]
    fn residual_from_assessment_score() {
        // A 90-scoring assessment leaves 10 points of control weakness.
        let score = residual_vendor_score(60.0, Some(90.0), &[]);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn inherent_stands_in_without_assessment() {
        let score = residual_vendor_score(60.0, None, &[]);
        assert_eq!(score, 60.0);
    }

    #[test]
    fn open_issues_add_penalties() {
        let score = residual_vendor_score(
            60.0,
            Some(80.0),
            &[IssueSeverity::Critical, IssueSeverity::Medium],
        );
        assert_eq!(score, 20.0 + 15.0 + 4.0);
    }

    #[test]
    fn residual_clamped_to_scale() {
        let many_criticals = vec![IssueSeverity::Critical; 10];
        let score = residual_vendor_score(60.0, Some(10.0), &many_criticals);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn residual_bands() {
        assert_eq!(residual_band(80.0), RiskLevel::Critical);
        assert_eq!(residual_band(75.0), RiskLevel::Critical);
        assert_eq!(residual_band(60.0), RiskLevel::High);
        assert_eq!(residual_band(30.0), RiskLevel::Medium);
        assert_eq!(residual_band(10.0), RiskLevel::Low);
    }
}
