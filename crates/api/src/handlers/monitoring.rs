//! Handlers for continuous monitoring signal ingestion.
//!
//! [`apply_signal`] is the whole pipeline: derive the risk level from the
//! raw observation, persist the signal, raise an issue for Critical
//! signals, and trigger a reassessment on a detected change above Low.
//! Observations whose derivation rules say "not worth a signal" (a
//! certificate expiring beyond 90 days, low-risk news, healthy financials)
//! produce no signal at all and the endpoint returns `data: null`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use veriguard_core::assessment::{AssessmentStatus, AssessmentType};
use veriguard_core::audit::actions;
use veriguard_core::issues::{IssuePriority, IssueSeverity, IssueSource};
use veriguard_core::monitoring::{
    change_detected, derive_risk_level, issue_category_for, raises_issue, reassessment_due,
    requires_action, triggers_reassessment,
};
use veriguard_core::permissions::Permission;
use veriguard_core::types::DbId;
use veriguard_db::models::monitoring::{MonitoringSignal, RecordSignal, SignalOutcome};
use veriguard_db::repositories::{AssessmentRepo, IssueRepo, MonitoringRepo, VendorRepo};
use veriguard_events::{event_types, PlatformEvent};

use crate::audit;
use crate::error::AppResult;
use crate::handlers::vendors::{ensure_vendor_exists, recompute_residual};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_permission;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Run the full signal pipeline for one observation.
///
/// Side effects run in a fixed order: issue creation first (Critical
/// only), then reassessment triggering. At most one triggered
/// reassessment stays open per vendor; a second qualifying signal while
/// one is open does not create a duplicate.
pub async fn apply_signal(
    state: &AppState,
    org_id: DbId,
    actor_user_id: Option<DbId>,
    input: &RecordSignal,
) -> AppResult<Option<SignalOutcome>> {
    let vendor = ensure_vendor_exists(state, input.vendor_id, org_id).await?;

    let Some(level) = derive_risk_level(&input.observation) else {
        tracing::debug!(
            vendor_id = vendor.id,
            monitoring_type = input.observation.monitoring_type().as_str(),
            "Observation below signal threshold, nothing recorded"
        );
        return Ok(None);
    };

    let monitoring_type = input.observation.monitoring_type();
    let changed = change_detected(input.previous_value.as_deref(), &input.current_value);
    let detected_at = input.detected_at.unwrap_or_else(chrono::Utc::now);

    let signal = MonitoringRepo::create(
        &state.pool,
        org_id,
        vendor.id,
        monitoring_type.as_str(),
        level.as_str(),
        &input.risk_description,
        &input.current_value,
        input.previous_value.as_deref(),
        changed,
        requires_action(level),
        detected_at,
    )
    .await?;

    // Side effect 1: a Critical signal raises an issue automatically.
    let mut issue_id = None;
    if raises_issue(level) {
        let category = issue_category_for(monitoring_type);
        let issue = IssueRepo::create(
            &state.pool,
            org_id,
            vendor.id,
            &format!("Critical {} signal", monitoring_type.as_str()),
            Some(&input.risk_description),
            IssueSeverity::Critical.as_str(),
            IssuePriority::Urgent.as_str(),
            IssueSource::ContinuousMonitoring.as_str(),
            category.as_str(),
        )
        .await?;
        issue_id = Some(issue.id);

        recompute_residual(state, &vendor).await?;

        state.event_bus.publish(
            PlatformEvent::new(event_types::ISSUE_CREATED)
                .with_org(org_id)
                .with_source("vendor_issue", issue.id)
                .with_payload(json!({
                    "severity": issue.severity,
                    "source": issue.source,
                    "signal_id": signal.id,
                })),
        );
    }

    // Side effect 2: a detected change above Low triggers a reassessment,
    // unless one is already open for this vendor.
    let mut reassessment_id = None;
    if triggers_reassessment(changed, level) {
        let existing = AssessmentRepo::find_open_triggered(&state.pool, vendor.id).await?;
        match existing {
            Some(open) => {
                tracing::info!(
                    vendor_id = vendor.id,
                    assessment_id = open.id,
                    "Triggered reassessment already open, not duplicating"
                );
            }
            None => {
                let assessment = AssessmentRepo::create(
                    &state.pool,
                    org_id,
                    vendor.id,
                    AssessmentType::TriggeredReassessment.as_str(),
                    AssessmentStatus::NotStarted.as_str(),
                    Some(reassessment_due(detected_at)),
                )
                .await?;
                reassessment_id = Some(assessment.id);

                state.event_bus.publish(
                    PlatformEvent::new(event_types::ASSESSMENT_TRIGGERED)
                        .with_org(org_id)
                        .with_source("vendor_assessment", assessment.id)
                        .with_payload(json!({"signal_id": signal.id})),
                );
            }
        }
    }

    VendorRepo::mark_monitored(&state.pool, vendor.id).await?;

    state.event_bus.publish({
        let mut event = PlatformEvent::new(event_types::SIGNAL_RECORDED)
            .with_org(org_id)
            .with_source("monitoring_signal", signal.id)
            .with_payload(json!({
                "vendor_id": vendor.id,
                "risk_level": signal.risk_level,
                "change_detected": signal.change_detected,
            }));
        if let Some(user_id) = actor_user_id {
            event = event.with_actor(user_id);
        }
        event
    });

    tracing::info!(
        vendor_id = vendor.id,
        signal_id = signal.id,
        risk_level = %signal.risk_level,
        change_detected = signal.change_detected,
        issue_id = ?issue_id,
        reassessment_id = ?reassessment_id,
        "Monitoring signal recorded"
    );

    Ok(Some(SignalOutcome {
        signal,
        issue_id,
        reassessment_id,
    }))
}

/// POST /api/v1/monitoring/signals
pub async fn record_signal(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RecordSignal>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::MonitoringRecord, org_id).await?;

    let details = json!({
        "vendor_id": input.vendor_id,
        "monitoring_type": input.observation.monitoring_type().as_str(),
    });
    let result = apply_signal(&state, org_id, Some(auth.user_id), &input).await;

    let outcome = audit::finish(
        &state,
        Some(&auth),
        actions::RECORD_SIGNAL,
        "monitoring_signal",
        details,
        result,
        |o: &Option<SignalOutcome>| o.as_ref().map(|o| o.signal.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/vendors/{vendor_id}/signals
pub async fn list_for_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::MonitoringView, org_id).await?;

    ensure_vendor_exists(&state, vendor_id, org_id).await?;
    let signals = MonitoringRepo::list_for_vendor(
        &state.pool,
        vendor_id,
        org_id,
        veriguard_db::clamp_limit(params.limit),
        veriguard_db::clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: signals }))
}

/// GET /api/v1/monitoring/actionable
///
/// Signals requiring action (Critical/High) that are not yet resolved.
pub async fn list_actionable(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::MonitoringView, org_id).await?;

    let signals = MonitoringRepo::list_actionable(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: signals }))
}

/// POST /api/v1/monitoring/signals/{signal_id}/acknowledge
pub async fn acknowledge(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(signal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::MonitoringAcknowledge, org_id).await?;

    let details = json!({"signal_id": signal_id});
    let result = async {
        MonitoringRepo::acknowledge(&state.pool, signal_id, org_id)
            .await?
            .ok_or_else(|| {
                crate::error::AppError::Core(veriguard_core::error::CoreError::NotFound {
                    entity: "MonitoringSignal",
                    id: signal_id,
                })
            })
    }
    .await;

    let signal = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "monitoring_signal",
        details,
        result,
        |s: &MonitoringSignal| Some(s.id),
    )
    .await?;

    Ok(Json(DataResponse { data: signal }))
}

/// POST /api/v1/monitoring/signals/{signal_id}/resolve
pub async fn resolve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(signal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let org_id = auth.organization_id;
    require_permission(&state, &auth, Permission::MonitoringAcknowledge, org_id).await?;

    let details = json!({"signal_id": signal_id});
    let result = async {
        MonitoringRepo::resolve(&state.pool, signal_id, org_id)
            .await?
            .ok_or_else(|| {
                crate::error::AppError::Core(veriguard_core::error::CoreError::NotFound {
                    entity: "MonitoringSignal",
                    id: signal_id,
                })
            })
    }
    .await;

    let signal = audit::finish(
        &state,
        Some(&auth),
        actions::UPDATE,
        "monitoring_signal",
        details,
        result,
        |s: &MonitoringSignal| Some(s.id),
    )
    .await?;

    Ok(Json(DataResponse { data: signal }))
}
