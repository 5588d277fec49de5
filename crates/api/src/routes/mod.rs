//! Route tree assembly.

pub mod api_keys;
pub mod assessments;
pub mod audit;
pub mod auth;
pub mod contracts;
pub mod external;
pub mod health;
pub mod issues;
pub mod monitoring;
pub mod organizations;
pub mod reports;
pub mod tasks;
pub mod users;
pub mod vendors;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
///
/// /organizations                               signup (public POST)
/// /organizations/{org_id}                      get, update
/// /organizations/{org_id}/status               suspend / reactivate / delete
///
/// /users                                       list, create
/// /users/{user_id}                             get, update, deactivate
/// /invitations                                 list, invite
/// /invitations/accept                          accept (public)
///
/// /vendors                                     list, create
/// /vendors/{vendor_id}                         get, update
/// /vendors/{vendor_id}/status                  lifecycle transition
/// /vendors/{vendor_id}/tier                    tier change
/// /vendors/{vendor_id}/assessments             assessment history
/// /vendors/{vendor_id}/issues                  issue list
/// /vendors/{vendor_id}/signals                 signal history
/// /vendors/{vendor_id}/contracts               contract list
///
/// /assessments                                 create
/// /assessments/{id}                            get
/// /assessments/{id}/status                     forward transition
/// /assessments/{id}/complete                   complete + rescore vendor
/// /assessments/{id}/approve                    approve
///
/// /issues                                      create
/// /issues/{id}                                 get
/// /issues/{id}/status                          remediation transition
///
/// /monitoring/signals                          record signal
/// /monitoring/signals/{id}/acknowledge         acknowledge
/// /monitoring/signals/{id}/resolve             resolve
/// /monitoring/actionable                       unresolved Critical/High
///
/// /workflows                                   list, create
/// /workflows/{id}                              detail with steps
/// /workflows/{id}/decisions                    submit step decision
/// /workflows/{id}/cancel                       cancel
///
/// /tasks                                       list, create
/// /tasks/overdue                               overdue (computed at query time)
/// /tasks/{id}                                  get, update
///
/// /contracts                                   create
/// /contracts/{id}                              get, update
///
/// /api-keys                                    list, create
/// /api-keys/{id}                               revoke
///
/// /audit                                       audit trail (admin)
///
/// /reports/dashboard                           executive summary
/// /reports/heatmap                             tier x residual band grid
/// /reports/scorecards                          per-vendor scorecards
///
/// /external/monitoring/signals                 signal ingestion (API key)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/organizations", organizations::router())
        .merge(users::router())
        .nest("/vendors", vendors::router())
        .nest("/assessments", assessments::router())
        .nest("/issues", issues::router())
        .nest("/monitoring", monitoring::router())
        .nest("/workflows", workflows::router())
        .nest("/tasks", tasks::router())
        .nest("/contracts", contracts::router())
        .nest("/api-keys", api_keys::router())
        .nest("/audit", audit::router())
        .nest("/reports", reports::router())
        .nest("/external", external::router())
}
