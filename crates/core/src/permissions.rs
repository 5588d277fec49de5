//! Role/permission matrix for organization members (PRD-03).
//!
//! Eight organization roles map onto a fixed permission universe. The
//! mapping is an exhaustive `match` so the compiler flags any role left
//! unhandled, and [`Permission::ALL`] is an explicit constant rather than a
//! spread of enum values -- a new permission must be added to `ALL` (and the
//! `ordinal` check below) by hand, which keeps permission grants deliberate.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role of a user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    /// Holds the full permission universe, including billing and deletion.
    OrgOwner,
    /// Full administration minus organization billing/deletion.
    Admin,
    ComplianceManager,
    RiskManager,
    VendorManager,
    /// Read-only across the platform, including the audit trail.
    Auditor,
    Analyst,
    /// Read-only on operational resources; no audit access.
    Viewer,
}

impl OrgRole {
    /// Stable string form, matching the `users.role` column values.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::OrgOwner => "org_owner",
            OrgRole::Admin => "admin",
            OrgRole::ComplianceManager => "compliance_manager",
            OrgRole::RiskManager => "risk_manager",
            OrgRole::VendorManager => "vendor_manager",
            OrgRole::Auditor => "auditor",
            OrgRole::Analyst => "analyst",
            OrgRole::Viewer => "viewer",
        }
    }
}

impl std::str::FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org_owner" => Ok(OrgRole::OrgOwner),
            "admin" => Ok(OrgRole::Admin),
            "compliance_manager" => Ok(OrgRole::ComplianceManager),
            "risk_manager" => Ok(OrgRole::RiskManager),
            "vendor_manager" => Ok(OrgRole::VendorManager),
            "auditor" => Ok(OrgRole::Auditor),
            "analyst" => Ok(OrgRole::Analyst),
            "viewer" => Ok(OrgRole::Viewer),
            other => Err(format!("Unknown organization role '{other}'")),
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// A single grantable capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Organization
    OrgView,
    OrgUpdate,
    OrgBilling,
    OrgDelete,
    // Users
    UserView,
    UserCreate,
    UserUpdate,
    UserDelete,
    UserInvite,
    // Vendors
    VendorView,
    VendorCreate,
    VendorUpdate,
    VendorDelete,
    VendorTierChange,
    // Assessments
    AssessmentView,
    AssessmentCreate,
    AssessmentSubmit,
    AssessmentReview,
    AssessmentApprove,
    // Issues
    IssueView,
    IssueCreate,
    IssueUpdate,
    IssueResolve,
    // Continuous monitoring
    MonitoringView,
    MonitoringRecord,
    MonitoringAcknowledge,
    // Approval workflows
    WorkflowView,
    WorkflowCreate,
    WorkflowDecide,
    WorkflowCancel,
    // Tasks
    TaskView,
    TaskCreate,
    TaskUpdate,
    TaskAssign,
    // Contracts
    ContractView,
    ContractCreate,
    ContractUpdate,
    // Reporting
    ReportView,
    ReportExport,
    // Audit trail
    AuditView,
    // API keys
    ApiKeyView,
    ApiKeyCreate,
    ApiKeyRevoke,
}

impl Permission {
    /// The full permission universe.
    ///
    /// Granted in its entirety to [`OrgRole::OrgOwner`] and to no one else.
    /// The `ordinal` function in the test module is an exhaustive `match`
    /// over `Permission`, so adding a variant without extending this array
    /// fails the `all_covers_every_variant` test.
    pub const ALL: [Permission; 43] = [
        Permission::OrgView,
        Permission::OrgUpdate,
        Permission::OrgBilling,
        Permission::OrgDelete,
        Permission::UserView,
        Permission::UserCreate,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::UserInvite,
        Permission::VendorView,
        Permission::VendorCreate,
        Permission::VendorUpdate,
        Permission::VendorDelete,
        Permission::VendorTierChange,
        Permission::AssessmentView,
        Permission::AssessmentCreate,
        Permission::AssessmentSubmit,
        Permission::AssessmentReview,
        Permission::AssessmentApprove,
        Permission::IssueView,
        Permission::IssueCreate,
        Permission::IssueUpdate,
        Permission::IssueResolve,
        Permission::MonitoringView,
        Permission::MonitoringRecord,
        Permission::MonitoringAcknowledge,
        Permission::WorkflowView,
        Permission::WorkflowCreate,
        Permission::WorkflowDecide,
        Permission::WorkflowCancel,
        Permission::TaskView,
        Permission::TaskCreate,
        Permission::TaskUpdate,
        Permission::TaskAssign,
        Permission::ContractView,
        Permission::ContractCreate,
        Permission::ContractUpdate,
        Permission::ReportView,
        Permission::ReportExport,
        Permission::AuditView,
        Permission::ApiKeyView,
        Permission::ApiKeyCreate,
        Permission::ApiKeyRevoke,
    ];
}

// ---------------------------------------------------------------------------
// Role -> permission mapping
// ---------------------------------------------------------------------------

/// Permissions granted to every member regardless of role.
const BASE_VIEW: &[Permission] = &[
    Permission::OrgView,
    Permission::VendorView,
    Permission::AssessmentView,
    Permission::IssueView,
    Permission::MonitoringView,
    Permission::WorkflowView,
    Permission::TaskView,
    Permission::ContractView,
    Permission::ReportView,
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::OrgUpdate,
    Permission::UserView,
    Permission::UserCreate,
    Permission::UserUpdate,
    Permission::UserDelete,
    Permission::UserInvite,
    Permission::VendorView,
    Permission::VendorCreate,
    Permission::VendorUpdate,
    Permission::VendorDelete,
    Permission::VendorTierChange,
    Permission::AssessmentView,
    Permission::AssessmentCreate,
    Permission::AssessmentSubmit,
    Permission::AssessmentReview,
    Permission::AssessmentApprove,
    Permission::IssueView,
    Permission::IssueCreate,
    Permission::IssueUpdate,
    Permission::IssueResolve,
    Permission::MonitoringView,
    Permission::MonitoringRecord,
    Permission::MonitoringAcknowledge,
    Permission::WorkflowView,
    Permission::WorkflowCreate,
    Permission::WorkflowDecide,
    Permission::WorkflowCancel,
    Permission::TaskView,
    Permission::TaskCreate,
    Permission::TaskUpdate,
    Permission::TaskAssign,
    Permission::ContractView,
    Permission::ContractCreate,
    Permission::ContractUpdate,
    Permission::ReportView,
    Permission::ReportExport,
    Permission::AuditView,
    Permission::ApiKeyView,
    Permission::ApiKeyCreate,
    Permission::ApiKeyRevoke,
];

const COMPLIANCE_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::UserView,
    Permission::VendorView,
    Permission::AssessmentView,
    Permission::AssessmentCreate,
    Permission::AssessmentSubmit,
    Permission::AssessmentReview,
    Permission::AssessmentApprove,
    Permission::IssueView,
    Permission::IssueCreate,
    Permission::IssueUpdate,
    Permission::IssueResolve,
    Permission::MonitoringView,
    Permission::WorkflowView,
    Permission::WorkflowDecide,
    Permission::TaskView,
    Permission::TaskCreate,
    Permission::TaskUpdate,
    Permission::TaskAssign,
    Permission::ContractView,
    Permission::ReportView,
    Permission::ReportExport,
    Permission::AuditView,
];

const RISK_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::UserView,
    Permission::VendorView,
    Permission::VendorTierChange,
    Permission::AssessmentView,
    Permission::AssessmentReview,
    Permission::IssueView,
    Permission::IssueCreate,
    Permission::IssueUpdate,
    Permission::IssueResolve,
    Permission::MonitoringView,
    Permission::MonitoringRecord,
    Permission::MonitoringAcknowledge,
    Permission::WorkflowView,
    Permission::WorkflowDecide,
    Permission::TaskView,
    Permission::TaskCreate,
    Permission::TaskUpdate,
    Permission::TaskAssign,
    Permission::ContractView,
    Permission::ReportView,
    Permission::ReportExport,
];

const VENDOR_MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::UserView,
    Permission::VendorView,
    Permission::VendorCreate,
    Permission::VendorUpdate,
    Permission::AssessmentView,
    Permission::AssessmentCreate,
    Permission::AssessmentSubmit,
    Permission::IssueView,
    Permission::IssueCreate,
    Permission::MonitoringView,
    Permission::MonitoringAcknowledge,
    Permission::WorkflowView,
    Permission::WorkflowCreate,
    Permission::TaskView,
    Permission::TaskCreate,
    Permission::TaskUpdate,
    Permission::ContractView,
    Permission::ContractCreate,
    Permission::ContractUpdate,
    Permission::ReportView,
];

const AUDITOR_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::UserView,
    Permission::VendorView,
    Permission::AssessmentView,
    Permission::IssueView,
    Permission::MonitoringView,
    Permission::WorkflowView,
    Permission::TaskView,
    Permission::ContractView,
    Permission::ReportView,
    Permission::ReportExport,
    Permission::AuditView,
];

const ANALYST_PERMISSIONS: &[Permission] = &[
    Permission::OrgView,
    Permission::VendorView,
    Permission::AssessmentView,
    Permission::AssessmentSubmit,
    Permission::IssueView,
    Permission::IssueUpdate,
    Permission::MonitoringView,
    Permission::MonitoringAcknowledge,
    Permission::WorkflowView,
    Permission::TaskView,
    Permission::TaskUpdate,
    Permission::ContractView,
    Permission::ReportView,
    Permission::ReportExport,
];

/// The set of permissions granted to a role.
///
/// Only `OrgOwner` receives [`Permission::ALL`]; every other role carries an
/// explicit, hand-maintained list and is a strict subset of the universe.
pub fn role_permissions(role: OrgRole) -> &'static [Permission] {
    match role {
        OrgRole::OrgOwner => &Permission::ALL,
        OrgRole::Admin => ADMIN_PERMISSIONS,
        OrgRole::ComplianceManager => COMPLIANCE_MANAGER_PERMISSIONS,
        OrgRole::RiskManager => RISK_MANAGER_PERMISSIONS,
        OrgRole::VendorManager => VENDOR_MANAGER_PERMISSIONS,
        OrgRole::Auditor => AUDITOR_PERMISSIONS,
        OrgRole::Analyst => ANALYST_PERMISSIONS,
        OrgRole::Viewer => BASE_VIEW,
    }
}

// ---------------------------------------------------------------------------
// Permission checks
// ---------------------------------------------------------------------------

/// The resolved actor a permission check runs against.
///
/// Built by the API layer from the `users` row the authenticated id resolved
/// to. `None` (user missing) always denies.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub organization_id: DbId,
    pub role: OrgRole,
    pub is_active: bool,
}

/// Decide whether `actor` holds `permission` within organization `org_id`.
///
/// Denies when the actor is absent, inactive, or belongs to a different
/// organization. The cross-tenant refusal is unconditional: a matching user
/// id in another tenant never passes.
pub fn has_permission(actor: Option<&Actor>, permission: Permission, org_id: DbId) -> bool {
    let Some(actor) = actor else {
        return false;
    };
    if !actor.is_active || actor.organization_id != org_id {
        return false;
    }
    role_permissions(actor.role).contains(&permission)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustive ordinal for every permission variant.
    ///
    /// The `match` fails to compile when a variant is added, forcing this
    /// module (and `Permission::ALL`) to be revisited.
    fn ordinal(p: Permission) -> usize {
        match p {
            Permission::OrgView => 0,
            Permission::OrgUpdate => 1,
            Permission::OrgBilling => 2,
            Permission::OrgDelete => 3,
            Permission::UserView => 4,
            Permission::UserCreate => 5,
            Permission::UserUpdate => 6,
            Permission::UserDelete => 7,
            Permission::UserInvite => 8,
            Permission::VendorView => 9,
            Permission::VendorCreate => 10,
            Permission::VendorUpdate => 11,
            Permission::VendorDelete => 12,
            Permission::VendorTierChange => 13,
            Permission::AssessmentView => 14,
            Permission::AssessmentCreate => 15,
            Permission::AssessmentSubmit => 16,
            Permission::AssessmentReview => 17,
            Permission::AssessmentApprove => 18,
            Permission::IssueView => 19,
            Permission::IssueCreate => 20,
            Permission::IssueUpdate => 21,
            Permission::IssueResolve => 22,
            Permission::MonitoringView => 23,
            Permission::MonitoringRecord => 24,
            Permission::MonitoringAcknowledge => 25,
            Permission::WorkflowView => 26,
            Permission::WorkflowCreate => 27,
            Permission::WorkflowDecide => 28,
            Permission::WorkflowCancel => 29,
            Permission::TaskView => 30,
            Permission::TaskCreate => 31,
            Permission::TaskUpdate => 32,
            Permission::TaskAssign => 33,
            Permission::ContractView => 34,
            Permission::ContractCreate => 35,
            Permission::ContractUpdate => 36,
            Permission::ReportView => 37,
            Permission::ReportExport => 38,
            Permission::AuditView => 39,
            Permission::ApiKeyView => 40,
            Permission::ApiKeyCreate => 41,
            Permission::ApiKeyRevoke => 42,
        }
    }

    const ALL_ROLES: [OrgRole; 8] = [
        OrgRole::OrgOwner,
        OrgRole::Admin,
        OrgRole::ComplianceManager,
        OrgRole::RiskManager,
        OrgRole::VendorManager,
        OrgRole::Auditor,
        OrgRole::Analyst,
        OrgRole::Viewer,
    ];

    fn actor(org_id: DbId, role: OrgRole) -> Actor {
        Actor {
            organization_id: org_id,
            role,
            is_active: true,
        }
    }

    // -- Permission universe -----------------------------------------------

    #[test]
    fn all_covers_every_variant() {
        let mut seen = [false; Permission::ALL.len()];
        for p in Permission::ALL {
            let idx = ordinal(p);
            assert!(!seen[idx], "duplicate permission in ALL: {p:?}");
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s), "ALL is missing a variant");
    }

    #[test]
    fn org_owner_holds_full_universe() {
        assert_eq!(role_permissions(OrgRole::OrgOwner), &Permission::ALL);
    }

    #[test]
    fn every_other_role_is_strict_subset() {
        for role in ALL_ROLES {
            if role == OrgRole::OrgOwner {
                continue;
            }
            let perms = role_permissions(role);
            assert!(
                perms.len() < Permission::ALL.len(),
                "{role} must hold strictly fewer permissions than org_owner"
            );
            for p in perms {
                assert!(
                    Permission::ALL.contains(p),
                    "{role} grants {p:?} which is outside the universe"
                );
            }
        }
    }

    #[test]
    fn only_org_owner_may_delete_org() {
        for role in ALL_ROLES {
            let holds = role_permissions(role).contains(&Permission::OrgDelete);
            assert_eq!(holds, role == OrgRole::OrgOwner, "role: {role}");
        }
    }

    #[test]
    fn no_role_grants_duplicates() {
        for role in ALL_ROLES {
            let perms = role_permissions(role);
            for (i, p) in perms.iter().enumerate() {
                assert!(
                    !perms[i + 1..].contains(p),
                    "{role} grants {p:?} more than once"
                );
            }
        }
    }

    // -- has_permission ----------------------------------------------------

    #[test]
    fn missing_user_denied() {
        assert!(!has_permission(None, Permission::VendorView, 1));
    }

    #[test]
    fn inactive_user_denied() {
        let mut a = actor(1, OrgRole::Admin);
        a.is_active = false;
        assert!(!has_permission(Some(&a), Permission::VendorView, 1));
    }

    #[test]
    fn cross_tenant_denied_even_for_org_owner() {
        let a = actor(1, OrgRole::OrgOwner);
        assert!(!has_permission(Some(&a), Permission::VendorView, 2));
    }

    #[test]
    fn matching_tenant_and_role_allowed() {
        let a = actor(7, OrgRole::VendorManager);
        assert!(has_permission(Some(&a), Permission::VendorCreate, 7));
    }

    #[test]
    fn viewer_cannot_mutate() {
        let a = actor(7, OrgRole::Viewer);
        assert!(!has_permission(Some(&a), Permission::VendorCreate, 7));
        assert!(has_permission(Some(&a), Permission::VendorView, 7));
    }

    // -- Role string round-trip --------------------------------------------

    #[test]
    fn role_string_round_trip() {
        for role in ALL_ROLES {
            let parsed: OrgRole = role.as_str().parse().expect("role must parse");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_string_rejected() {
        assert!("superuser".parse::<OrgRole>().is_err());
    }
}
