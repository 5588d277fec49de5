//! Continuous monitoring signal derivation (PRD-10).
//!
//! External observations about a vendor (security ratings, breach notices,
//! certificate expiry, news, financial health, M&A activity) are distilled
//! into a risk level by fixed, type-specific threshold rules. The derived
//! level decides whether the signal is recorded at all, whether it demands
//! action, whether an issue is raised, and whether a reassessment is
//! triggered. The orchestration (persist, raise issue, trigger
//! reassessment) lives in the API layer; everything here is a pure rule.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::issues::IssueCategory;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// What kind of observation produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringType {
    SecurityRating,
    BreachNotification,
    CertificateExpiry,
    NewsMention,
    FinancialHealth,
    MAndAActivity,
}

impl MonitoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoringType::SecurityRating => "security_rating",
            MonitoringType::BreachNotification => "breach_notification",
            MonitoringType::CertificateExpiry => "certificate_expiry",
            MonitoringType::NewsMention => "news_mention",
            MonitoringType::FinancialHealth => "financial_health",
            MonitoringType::MAndAActivity => "m_and_a_activity",
        }
    }
}

impl std::str::FromStr for MonitoringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security_rating" => Ok(MonitoringType::SecurityRating),
            "breach_notification" => Ok(MonitoringType::BreachNotification),
            "certificate_expiry" => Ok(MonitoringType::CertificateExpiry),
            "news_mention" => Ok(MonitoringType::NewsMention),
            "financial_health" => Ok(MonitoringType::FinancialHealth),
            "m_and_a_activity" => Ok(MonitoringType::MAndAActivity),
            other => Err(format!("Unknown monitoring type '{other}'")),
        }
    }
}

/// Derived risk level of a signal. Never supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(RiskLevel::Critical),
            "high" => Ok(RiskLevel::High),
            "medium" => Ok(RiskLevel::Medium),
            "low" => Ok(RiskLevel::Low),
            other => Err(format!("Unknown risk level '{other}'")),
        }
    }
}

/// News sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Reported profitability state for financial health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profitability {
    Profitable,
    Loss,
}

/// Reported cash flow direction for financial health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlow {
    Positive,
    Negative,
}

// ---------------------------------------------------------------------------
// Threshold constants
// ---------------------------------------------------------------------------

/// Security ratings below this are Critical.
pub const SECURITY_RATING_CRITICAL_BELOW: i32 = 400;
/// Security ratings below this (and >= the critical cutoff) are High.
pub const SECURITY_RATING_HIGH_BELOW: i32 = 600;
/// Security ratings below this (and >= the high cutoff) are Medium.
pub const SECURITY_RATING_MEDIUM_BELOW: i32 = 750;

/// Certificates expiring within this many days are High.
pub const CERT_EXPIRY_HIGH_WITHIN_DAYS: i64 = 30;
/// Certificates expiring within this many days are Medium; beyond it no
/// signal is emitted at all.
pub const CERT_EXPIRY_SIGNAL_WINDOW_DAYS: i64 = 90;

/// Breaches affecting more than this many records are Critical.
pub const BREACH_CRITICAL_ABOVE_RECORDS: i64 = 10_000;

/// Negative news containing any of these keywords is High.
pub const NEWS_HIGH_RISK_KEYWORDS: &[&str] = &["breach", "hack"];

/// Days until a triggered reassessment is due.
pub const REASSESSMENT_DUE_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Observations and derivation
// ---------------------------------------------------------------------------

/// A raw, type-specific observation before derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "monitoring_type", rename_all = "snake_case")]
pub enum Observation {
    SecurityRating { score: i32 },
    BreachNotification { records_affected: i64 },
    CertificateExpiry { days_until_expiry: i64 },
    NewsMention { sentiment: Sentiment, keywords: Vec<String> },
    FinancialHealth { profitability: Profitability, cash_flow: CashFlow },
    MAndAActivity,
}

impl Observation {
    pub fn monitoring_type(&self) -> MonitoringType {
        match self {
            Observation::SecurityRating { .. } => MonitoringType::SecurityRating,
            Observation::BreachNotification { .. } => MonitoringType::BreachNotification,
            Observation::CertificateExpiry { .. } => MonitoringType::CertificateExpiry,
            Observation::NewsMention { .. } => MonitoringType::NewsMention,
            Observation::FinancialHealth { .. } => MonitoringType::FinancialHealth,
            Observation::MAndAActivity => MonitoringType::MAndAActivity,
        }
    }
}

/// Derive the risk level for an observation.
///
/// Returns `None` when the observation does not warrant a signal at all
/// (certificate expiring beyond 90 days, low-risk news, healthy financials).
/// The thresholds are fixed product rules; change them only alongside the
/// monitoring connector contracts.
pub fn derive_risk_level(observation: &Observation) -> Option<RiskLevel> {
    match observation {
        Observation::SecurityRating { score } => Some(security_rating_risk(*score)),
        Observation::BreachNotification { records_affected } => {
            // A confirmed breach is never Medium or Low.
            Some(if *records_affected > BREACH_CRITICAL_ABOVE_RECORDS {
                RiskLevel::Critical
            } else {
                RiskLevel::High
            })
        }
        Observation::CertificateExpiry { days_until_expiry } => {
            certificate_expiry_risk(*days_until_expiry)
        }
        Observation::NewsMention { sentiment, keywords } => {
            news_mention_risk(*sentiment, keywords)
        }
        Observation::FinancialHealth {
            profitability,
            cash_flow,
        } => financial_health_risk(*profitability, *cash_flow),
        Observation::MAndAActivity => Some(RiskLevel::High),
    }
}

fn security_rating_risk(score: i32) -> RiskLevel {
    if score < SECURITY_RATING_CRITICAL_BELOW {
        RiskLevel::Critical
    } else if score < SECURITY_RATING_HIGH_BELOW {
        RiskLevel::High
    } else if score < SECURITY_RATING_MEDIUM_BELOW {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn certificate_expiry_risk(days_until_expiry: i64) -> Option<RiskLevel> {
    if days_until_expiry > CERT_EXPIRY_SIGNAL_WINDOW_DAYS {
        return None;
    }
    Some(if days_until_expiry < 0 {
        RiskLevel::Critical
    } else if days_until_expiry < CERT_EXPIRY_HIGH_WITHIN_DAYS {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    })
}

fn news_mention_risk(sentiment: Sentiment, keywords: &[String]) -> Option<RiskLevel> {
    let level = match sentiment {
        Sentiment::Negative => {
            let high_risk = keywords.iter().any(|k| {
                let k = k.to_ascii_lowercase();
                NEWS_HIGH_RISK_KEYWORDS.iter().any(|hot| k.contains(hot))
            });
            if high_risk {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            }
        }
        Sentiment::Positive | Sentiment::Neutral => RiskLevel::Low,
    };
    // Low-risk mentions are not worth a signal.
    (level != RiskLevel::Low).then_some(level)
}

fn financial_health_risk(
    profitability: Profitability,
    cash_flow: CashFlow,
) -> Option<RiskLevel> {
    match (profitability, cash_flow) {
        (Profitability::Loss, CashFlow::Negative) => Some(RiskLevel::High),
        (Profitability::Profitable, CashFlow::Negative) => Some(RiskLevel::Medium),
        (_, CashFlow::Positive) => None,
    }
}

// ---------------------------------------------------------------------------
// Signal attributes and side-effect rules
// ---------------------------------------------------------------------------

/// A value change was detected when a previous value exists and differs from
/// the current one.
pub fn change_detected(previous_value: Option<&str>, current_value: &str) -> bool {
    matches!(previous_value, Some(prev) if prev != current_value)
}

/// A signal requires action when its risk level is Critical or High.
pub fn requires_action(level: RiskLevel) -> bool {
    matches!(level, RiskLevel::Critical | RiskLevel::High)
}

/// Whether a Critical signal raises an automatic vendor issue.
pub fn raises_issue(level: RiskLevel) -> bool {
    level == RiskLevel::Critical
}

/// Issue category for an automatically raised issue, by monitoring type.
pub fn issue_category_for(monitoring_type: MonitoringType) -> IssueCategory {
    match monitoring_type {
        MonitoringType::SecurityRating => IssueCategory::SecurityVulnerability,
        MonitoringType::BreachNotification => IssueCategory::DataBreach,
        MonitoringType::CertificateExpiry => IssueCategory::ComplianceGap,
        MonitoringType::NewsMention => IssueCategory::ReputationalRisk,
        MonitoringType::FinancialHealth => IssueCategory::FinancialConcern,
        MonitoringType::MAndAActivity => IssueCategory::Other,
    }
}

/// Whether a signal triggers an automatic reassessment: a detected change
/// at any level above Low.
pub fn triggers_reassessment(change_detected: bool, level: RiskLevel) -> bool {
    change_detected && level != RiskLevel::Low
}

/// Due date for a triggered reassessment: seven days after detection.
pub fn reassessment_due(detected_at: Timestamp) -> Timestamp {
    detected_at + Duration::days(REASSESSMENT_DUE_DAYS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // -- Security rating ---------------------------------------------------

    #[test]
    fn rating_350_is_critical() {
        let obs = Observation::SecurityRating { score: 350 };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Critical));
    }

    #[test]
    fn rating_boundaries() {
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 399 }),
            Some(RiskLevel::Critical)
        );
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 400 }),
            Some(RiskLevel::High)
        );
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 599 }),
            Some(RiskLevel::High)
        );
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 600 }),
            Some(RiskLevel::Medium)
        );
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 749 }),
            Some(RiskLevel::Medium)
        );
        assert_eq!(
            derive_risk_level(&Observation::SecurityRating { score: 750 }),
            Some(RiskLevel::Low)
        );
    }

    // -- Certificate expiry ------------------------------------------------

    #[test]
    fn expired_certificate_is_critical() {
        let obs = Observation::CertificateExpiry {
            days_until_expiry: -1,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Critical));
    }

    #[test]
    fn certificate_expiring_in_15_days_is_high() {
        let obs = Observation::CertificateExpiry {
            days_until_expiry: 15,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    #[test]
    fn certificate_expiring_in_60_days_is_medium() {
        let obs = Observation::CertificateExpiry {
            days_until_expiry: 60,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Medium));
    }

    #[test]
    fn certificate_expiring_in_120_days_emits_nothing() {
        let obs = Observation::CertificateExpiry {
            days_until_expiry: 120,
        };
        assert_eq!(derive_risk_level(&obs), None);
    }

    #[test]
    fn certificate_window_boundaries() {
        assert_eq!(
            derive_risk_level(&Observation::CertificateExpiry {
                days_until_expiry: 90
            }),
            Some(RiskLevel::Medium),
            "exactly 90 days is still inside the signal window"
        );
        assert_eq!(
            derive_risk_level(&Observation::CertificateExpiry {
                days_until_expiry: 91
            }),
            None
        );
        assert_eq!(
            derive_risk_level(&Observation::CertificateExpiry {
                days_until_expiry: 29
            }),
            Some(RiskLevel::High)
        );
        assert_eq!(
            derive_risk_level(&Observation::CertificateExpiry {
                days_until_expiry: 30
            }),
            Some(RiskLevel::Medium)
        );
        assert_eq!(
            derive_risk_level(&Observation::CertificateExpiry {
                days_until_expiry: 0
            }),
            Some(RiskLevel::High)
        );
    }

    // -- Data breach -------------------------------------------------------

    #[test]
    fn large_breach_is_critical() {
        let obs = Observation::BreachNotification {
            records_affected: 10_001,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Critical));
    }

    #[test]
    fn small_breach_is_still_high() {
        let obs = Observation::BreachNotification {
            records_affected: 10,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    #[test]
    fn breach_boundary_at_ten_thousand() {
        let obs = Observation::BreachNotification {
            records_affected: 10_000,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    // -- News mentions -----------------------------------------------------

    #[test]
    fn negative_news_with_breach_keyword_is_high() {
        let obs = Observation::NewsMention {
            sentiment: Sentiment::Negative,
            keywords: vec!["data breach".to_string()],
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    #[test]
    fn negative_news_with_hack_keyword_is_high() {
        let obs = Observation::NewsMention {
            sentiment: Sentiment::Negative,
            keywords: vec!["Hacked".to_string()],
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    #[test]
    fn negative_news_alone_is_medium() {
        let obs = Observation::NewsMention {
            sentiment: Sentiment::Negative,
            keywords: vec!["lawsuit".to_string()],
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Medium));
    }

    #[test]
    fn positive_news_emits_nothing() {
        let obs = Observation::NewsMention {
            sentiment: Sentiment::Positive,
            keywords: vec!["breach".to_string()],
        };
        assert_eq!(derive_risk_level(&obs), None);
    }

    #[test]
    fn neutral_news_emits_nothing() {
        let obs = Observation::NewsMention {
            sentiment: Sentiment::Neutral,
            keywords: Vec::new(),
        };
        assert_eq!(derive_risk_level(&obs), None);
    }

    // -- Financial health --------------------------------------------------

    #[test]
    fn loss_with_negative_cash_flow_is_high() {
        let obs = Observation::FinancialHealth {
            profitability: Profitability::Loss,
            cash_flow: CashFlow::Negative,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::High));
    }

    #[test]
    fn negative_cash_flow_alone_is_medium() {
        let obs = Observation::FinancialHealth {
            profitability: Profitability::Profitable,
            cash_flow: CashFlow::Negative,
        };
        assert_eq!(derive_risk_level(&obs), Some(RiskLevel::Medium));
    }

    #[test]
    fn healthy_financials_emit_nothing() {
        let obs = Observation::FinancialHealth {
            profitability: Profitability::Profitable,
            cash_flow: CashFlow::Positive,
        };
        assert_eq!(derive_risk_level(&obs), None);
        // Loss-making but cash-positive is also quiet.
        let obs = Observation::FinancialHealth {
            profitability: Profitability::Loss,
            cash_flow: CashFlow::Positive,
        };
        assert_eq!(derive_risk_level(&obs), None);
    }

    // -- M&A ---------------------------------------------------------------

    #[test]
    fn m_and_a_is_always_high() {
        assert_eq!(
            derive_risk_level(&Observation::MAndAActivity),
            Some(RiskLevel::High)
        );
    }

    // -- Signal attributes -------------------------------------------------

    #[test]
    fn change_detection() {
        assert!(change_detected(Some("600"), "350"));
        assert!(!change_detected(Some("350"), "350"));
        assert!(!change_detected(None, "350"));
    }

    #[test]
    fn action_required_for_critical_and_high() {
        assert!(requires_action(RiskLevel::Critical));
        assert!(requires_action(RiskLevel::High));
        assert!(!requires_action(RiskLevel::Medium));
        assert!(!requires_action(RiskLevel::Low));
    }

    #[test]
    fn only_critical_raises_issue() {
        assert!(raises_issue(RiskLevel::Critical));
        assert!(!raises_issue(RiskLevel::High));
    }

    #[test]
    fn issue_category_mapping() {
        assert_eq!(
            issue_category_for(MonitoringType::SecurityRating),
            IssueCategory::SecurityVulnerability
        );
        assert_eq!(
            issue_category_for(MonitoringType::BreachNotification),
            IssueCategory::DataBreach
        );
        assert_eq!(
            issue_category_for(MonitoringType::CertificateExpiry),
            IssueCategory::ComplianceGap
        );
        assert_eq!(
            issue_category_for(MonitoringType::NewsMention),
            IssueCategory::ReputationalRisk
        );
        assert_eq!(
            issue_category_for(MonitoringType::FinancialHealth),
            IssueCategory::FinancialConcern
        );
        assert_eq!(
            issue_category_for(MonitoringType::MAndAActivity),
            IssueCategory::Other
        );
    }

    #[test]
    fn reassessment_trigger_rule() {
        assert!(triggers_reassessment(true, RiskLevel::Critical));
        assert!(triggers_reassessment(true, RiskLevel::Medium));
        assert!(!triggers_reassessment(true, RiskLevel::Low));
        assert!(!triggers_reassessment(false, RiskLevel::Critical));
    }

    #[test]
    fn reassessment_due_in_seven_days() {
        let detected = Utc::now();
        assert_eq!(reassessment_due(detected), detected + Duration::days(7));
    }
}
