//! Sequential approval workflow engine (PRD-07).
//!
//! A workflow carries an ordered chain of approval steps for a vendor
//! lifecycle action. Steps are decided strictly in order: a decision
//! submitted for any step other than the current pending one is rejected.
//! `Rejected` and `Escalated` halt the chain; `ConditionallyApproved`
//! advances and carries its conditions forward to the next approver;
//! `Deferred` records the pause without consuming the step.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::permissions::OrgRole;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Workflow and decision vocabulary
// ---------------------------------------------------------------------------

/// The vendor action a workflow approves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Onboarding,
    ContractRenewal,
    TierChange,
    ReassessmentApproval,
    RiskAcceptance,
    Termination,
    FourthPartyApproval,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Onboarding => "onboarding",
            WorkflowType::ContractRenewal => "contract_renewal",
            WorkflowType::TierChange => "tier_change",
            WorkflowType::ReassessmentApproval => "reassessment_approval",
            WorkflowType::RiskAcceptance => "risk_acceptance",
            WorkflowType::Termination => "termination",
            WorkflowType::FourthPartyApproval => "fourth_party_approval",
        }
    }
}

impl std::str::FromStr for WorkflowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onboarding" => Ok(WorkflowType::Onboarding),
            "contract_renewal" => Ok(WorkflowType::ContractRenewal),
            "tier_change" => Ok(WorkflowType::TierChange),
            "reassessment_approval" => Ok(WorkflowType::ReassessmentApproval),
            "risk_acceptance" => Ok(WorkflowType::RiskAcceptance),
            "termination" => Ok(WorkflowType::Termination),
            "fourth_party_approval" => Ok(WorkflowType::FourthPartyApproval),
            other => Err(format!("Unknown workflow type '{other}'")),
        }
    }
}

/// A single approver's decision on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
    ConditionallyApproved,
    Escalated,
    /// Pauses the step without consuming it; may be resubmitted.
    Deferred,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
            Decision::ConditionallyApproved => "conditionally_approved",
            Decision::Escalated => "escalated",
            Decision::Deferred => "deferred",
        }
    }

    /// Whether this decision consumes the step (advances or halts the chain).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Deferred)
    }

    /// Whether this decision halts the whole workflow.
    pub fn halts(&self) -> bool {
        matches!(self, Decision::Rejected | Decision::Escalated)
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            "conditionally_approved" => Ok(Decision::ConditionallyApproved),
            "escalated" => Ok(Decision::Escalated),
            "deferred" => Ok(Decision::Deferred),
            other => Err(format!("Unknown decision '{other}'")),
        }
    }
}

/// Derived status of the whole workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
    Rejected,
    Escalated,
    Cancelled,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Escalated => "escalated",
            WorkflowStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(WorkflowStatus::InProgress),
            "completed" => Ok(WorkflowStatus::Completed),
            "rejected" => Ok(WorkflowStatus::Rejected),
            "escalated" => Ok(WorkflowStatus::Escalated),
            "cancelled" => Ok(WorkflowStatus::Cancelled),
            other => Err(format!("Unknown workflow status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Approval steps
// ---------------------------------------------------------------------------

/// One link in the approval chain.
///
/// `conditions` are set by this step's approver on a conditional approval;
/// `carried_conditions` are inherited from earlier conditional approvals and
/// shown to this step's approver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// 1-based position in the chain.
    pub step_order: i32,
    /// Role expected to decide this step.
    pub approver_role: OrgRole,
    /// Specific user pinned to this step, when assigned.
    pub approver_user_id: Option<DbId>,
    pub decision: Option<Decision>,
    pub comments: Option<String>,
    pub conditions: Vec<String>,
    pub carried_conditions: Vec<String>,
    pub decided_at: Option<Timestamp>,
}

impl ApprovalStep {
    /// A fresh, undecided step.
    pub fn new(step_order: i32, approver_role: OrgRole, approver_user_id: Option<DbId>) -> Self {
        Self {
            step_order,
            approver_role,
            approver_user_id,
            decision: None,
            comments: None,
            conditions: Vec::new(),
            carried_conditions: Vec::new(),
            decided_at: None,
        }
    }

    /// Whether this step still awaits a consuming decision.
    ///
    /// A deferred step is still pending: the deferral is recorded but the
    /// step was not consumed.
    pub fn is_pending(&self) -> bool {
        match self.decision {
            None => true,
            Some(d) => !d.is_terminal(),
        }
    }
}

/// Validate a chain definition at workflow creation time.
///
/// The chain must be non-empty and its `step_order` values must be exactly
/// `1..=len` in order.
pub fn validate_chain(steps: &[ApprovalStep]) -> Result<(), CoreError> {
    if steps.is_empty() {
        return Err(CoreError::Validation(
            "Approval chain must contain at least one step".to_string(),
        ));
    }
    for (i, step) in steps.iter().enumerate() {
        let expected = i as i32 + 1;
        if step.step_order != expected {
            return Err(CoreError::Validation(format!(
                "Approval chain step orders must be sequential from 1; position {i} has order {}",
                step.step_order
            )));
        }
    }
    Ok(())
}

/// The order of the current pending step, or `None` when every step is
/// consumed (the chain is complete or halted).
pub fn current_pending_step(steps: &[ApprovalStep]) -> Option<i32> {
    // A halting decision freezes the chain; nothing after it is pending.
    for step in steps {
        if let Some(d) = step.decision {
            if d.halts() {
                return None;
            }
        }
        if step.is_pending() {
            return Some(step.step_order);
        }
    }
    None
}

/// Derive the workflow status from its steps.
pub fn derive_status(steps: &[ApprovalStep]) -> WorkflowStatus {
    for step in steps {
        match step.decision {
            Some(Decision::Rejected) => return WorkflowStatus::Rejected,
            Some(Decision::Escalated) => return WorkflowStatus::Escalated,
            _ => {}
        }
    }
    if steps.iter().all(|s| !s.is_pending()) {
        WorkflowStatus::Completed
    } else {
        WorkflowStatus::InProgress
    }
}

/// Whether the workflow is complete: every step carries a terminal,
/// non-deferred decision and none is rejected or escalated.
pub fn is_complete(steps: &[ApprovalStep]) -> bool {
    derive_status(steps) == WorkflowStatus::Completed
}

/// Record a decision on the chain.
///
/// `step_order` must equal the current pending step; submissions for any
/// other step (already consumed, out of order, or after a halt) fail with a
/// Validation error. Returns the derived workflow status after the decision
/// is applied.
pub fn submit_decision(
    steps: &mut [ApprovalStep],
    step_order: i32,
    decision: Decision,
    comments: Option<String>,
    conditions: Vec<String>,
    now: Timestamp,
) -> Result<WorkflowStatus, CoreError> {
    let current = current_pending_step(steps).ok_or_else(|| {
        CoreError::Validation(format!(
            "Workflow is {}; no further decisions accepted",
            derive_status(steps).as_str()
        ))
    })?;

    if step_order != current {
        return Err(CoreError::Validation(format!(
            "Decision submitted for step {step_order} but the current pending step is {current}"
        )));
    }

    let idx = steps
        .iter()
        .position(|s| s.step_order == step_order)
        .expect("current pending step must exist in the chain");

    {
        let step = &mut steps[idx];
        step.decision = Some(decision);
        step.comments = comments;
        step.conditions = conditions;
        step.decided_at = Some(now);
    }

    // Conditional approval: the next approver sees the accumulated
    // conditions from every conditional approval so far.
    if decision == Decision::ConditionallyApproved {
        let mut carried = steps[idx].carried_conditions.clone();
        carried.extend(steps[idx].conditions.iter().cloned());
        if let Some(next) = steps.get_mut(idx + 1) {
            next.carried_conditions = carried;
        }
    }

    Ok(derive_status(steps))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chain(len: i32) -> Vec<ApprovalStep> {
        (1..=len)
            .map(|i| ApprovalStep::new(i, OrgRole::RiskManager, None))
            .collect()
    }

    fn decide(
        steps: &mut [ApprovalStep],
        order: i32,
        decision: Decision,
    ) -> Result<WorkflowStatus, CoreError> {
        submit_decision(steps, order, decision, None, Vec::new(), Utc::now())
    }

    // -- Chain validation --------------------------------------------------

    #[test]
    fn empty_chain_rejected() {
        assert!(validate_chain(&[]).is_err());
    }

    #[test]
    fn single_step_chain_valid() {
        assert!(validate_chain(&chain(1)).is_ok());
    }

    #[test]
    fn non_sequential_orders_rejected() {
        let mut steps = chain(3);
        steps[1].step_order = 5;
        assert!(validate_chain(&steps).is_err());
    }

    // -- Sequencing --------------------------------------------------------

    #[test]
    fn first_step_is_initially_pending() {
        assert_eq!(current_pending_step(&chain(3)), Some(1));
    }

    #[test]
    fn out_of_order_submission_rejected() {
        let mut steps = chain(3);
        let err = decide(&mut steps, 2, Decision::Approved).unwrap_err();
        assert!(err.to_string().contains("current pending step is 1"));
        // The chain is untouched.
        assert!(steps.iter().all(|s| s.decision.is_none()));
    }

    #[test]
    fn approval_advances_to_next_step() {
        let mut steps = chain(3);
        let status = decide(&mut steps, 1, Decision::Approved).unwrap();
        assert_eq!(status, WorkflowStatus::InProgress);
        assert_eq!(current_pending_step(&steps), Some(2));
    }

    #[test]
    fn resubmitting_consumed_step_rejected() {
        let mut steps = chain(2);
        decide(&mut steps, 1, Decision::Approved).unwrap();
        assert!(decide(&mut steps, 1, Decision::Approved).is_err());
    }

    // -- Halting decisions -------------------------------------------------

    #[test]
    fn rejection_halts_workflow() {
        let mut steps = chain(3);
        decide(&mut steps, 1, Decision::Approved).unwrap();
        let status = decide(&mut steps, 2, Decision::Rejected).unwrap();
        assert_eq!(status, WorkflowStatus::Rejected);
        assert_eq!(current_pending_step(&steps), None);
        // Later steps never receive decisions.
        assert!(decide(&mut steps, 3, Decision::Approved).is_err());
        assert!(steps[2].decision.is_none());
    }

    #[test]
    fn escalation_halts_workflow() {
        let mut steps = chain(2);
        let status = decide(&mut steps, 1, Decision::Escalated).unwrap();
        assert_eq!(status, WorkflowStatus::Escalated);
        assert_eq!(current_pending_step(&steps), None);
    }

    // -- Deferral ----------------------------------------------------------

    #[test]
    fn deferral_keeps_step_pending() {
        let mut steps = chain(2);
        let status = decide(&mut steps, 1, Decision::Deferred).unwrap();
        assert_eq!(status, WorkflowStatus::InProgress);
        assert_eq!(current_pending_step(&steps), Some(1));
    }

    #[test]
    fn deferred_step_can_be_resubmitted() {
        let mut steps = chain(2);
        decide(&mut steps, 1, Decision::Deferred).unwrap();
        let status = decide(&mut steps, 1, Decision::Approved).unwrap();
        assert_eq!(status, WorkflowStatus::InProgress);
        assert_eq!(current_pending_step(&steps), Some(2));
    }

    // -- Conditional approval ----------------------------------------------

    #[test]
    fn conditions_carry_forward_to_next_step() {
        let mut steps = chain(3);
        submit_decision(
            &mut steps,
            1,
            Decision::ConditionallyApproved,
            Some("Pending SOC 2 report".to_string()),
            vec!["Provide SOC 2 Type II report".to_string()],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            steps[1].carried_conditions,
            vec!["Provide SOC 2 Type II report".to_string()]
        );
        // Step 3 sees nothing until step 2 decides.
        assert!(steps[2].carried_conditions.is_empty());
    }

    #[test]
    fn conditions_accumulate_across_conditional_approvals() {
        let mut steps = chain(3);
        submit_decision(
            &mut steps,
            1,
            Decision::ConditionallyApproved,
            None,
            vec!["condition-a".to_string()],
            Utc::now(),
        )
        .unwrap();
        submit_decision(
            &mut steps,
            2,
            Decision::ConditionallyApproved,
            None,
            vec!["condition-b".to_string()],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            steps[2].carried_conditions,
            vec!["condition-a".to_string(), "condition-b".to_string()]
        );
    }

    // -- Completion --------------------------------------------------------

    #[test]
    fn workflow_completes_when_all_steps_decided() {
        let mut steps = chain(2);
        decide(&mut steps, 1, Decision::Approved).unwrap();
        let status = decide(&mut steps, 2, Decision::ConditionallyApproved).unwrap();
        assert_eq!(status, WorkflowStatus::Completed);
        assert!(is_complete(&steps));
    }

    #[test]
    fn deferred_chain_is_not_complete() {
        let mut steps = chain(1);
        decide(&mut steps, 1, Decision::Deferred).unwrap();
        assert!(!is_complete(&steps));
    }

    #[test]
    fn rejected_chain_is_not_complete() {
        let mut steps = chain(1);
        decide(&mut steps, 1, Decision::Rejected).unwrap();
        assert!(!is_complete(&steps));
        assert_eq!(derive_status(&steps), WorkflowStatus::Rejected);
    }

    #[test]
    fn completed_workflow_accepts_no_more_decisions() {
        let mut steps = chain(1);
        decide(&mut steps, 1, Decision::Approved).unwrap();
        let err = decide(&mut steps, 1, Decision::Approved).unwrap_err();
        assert!(err.to_string().contains("completed"));
    }
}
