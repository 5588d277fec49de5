//! HTTP-level integration tests for the approval workflow engine:
//! sequencing, halting, deferral, and conditional carry-forward.

mod common;

use axum::http::StatusCode;
use common::{create_test_org, create_test_user, expect_status, post_json_auth, token_for};
use serde_json::json;
use sqlx::PgPool;
use veriguard_core::permissions::OrgRole;
use veriguard_core::types::DbId;

/// Create a vendor and a two-step risk-manager workflow, returning
/// (vendor_id, workflow_id).
async fn setup_workflow(app: axum::Router, token: &str, subdomain_tag: &str) -> (DbId, DbId) {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/vendors",
        token,
        json!({"name": format!("{subdomain_tag} vendor"), "tier": "high"}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let vendor_id = body["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        "/api/v1/workflows",
        token,
        json!({
            "vendor_id": vendor_id,
            "workflow_type": "onboarding",
            "name": "Onboarding approval",
            "approval_chain": [
                {"approver_role": "risk_manager"},
                {"approver_role": "risk_manager"}
            ]
        }),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let workflow_id = body["data"]["id"].as_i64().unwrap();

    (vendor_id, workflow_id)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_chain_is_rejected(pool: PgPool) {
    let org = create_test_org(&pool, "wf-empty", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfe.test", OrgRole::RiskManager).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/vendors",
        &token,
        json!({"name": "Chainless", "tier": "low"}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let vendor_id = body["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        "/api/v1/workflows",
        &token,
        json!({
            "vendor_id": vendor_id,
            "workflow_type": "onboarding",
            "name": "No chain",
            "approval_chain": []
        }),
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn out_of_order_decision_is_rejected(pool: PgPool) {
    let org = create_test_org(&pool, "wf-order", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfo.test", OrgRole::RiskManager).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool.clone()).await;
    let (_vendor, workflow) = setup_workflow(app.clone(), &token, "wf-order").await;

    // Step 2 before step 1: validation error.
    let response = post_json_auth(
        app,
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 2, "decision": "approved"}),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("current pending step is 1"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejection_halts_later_steps(pool: PgPool) {
    let org = create_test_org(&pool, "wf-halt", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfh.test", OrgRole::RiskManager).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool.clone()).await;
    let (_vendor, workflow) = setup_workflow(app.clone(), &token, "wf-halt").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 1, "decision": "rejected", "comments": "Unacceptable risk"}),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "rejected");

    // Step 2 never receives a decision.
    let response = post_json_auth(
        app,
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 2, "decision": "approved"}),
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;

    let decision: Option<String> = sqlx::query_scalar(
        "SELECT decision FROM approval_steps WHERE workflow_id = $1 AND step_order = 2",
    )
    .bind(workflow)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(decision.is_none(), "halted step must stay undecided");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn conditional_approval_carries_conditions_and_completes(pool: PgPool) {
    let org = create_test_org(&pool, "wf-cond", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfc.test", OrgRole::RiskManager).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool.clone()).await;
    let (_vendor, workflow) = setup_workflow(app.clone(), &token, "wf-cond").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({
            "step_order": 1,
            "decision": "conditionally_approved",
            "conditions": ["Provide SOC 2 Type II report"]
        }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "in_progress");
    // The next approver sees the inherited conditions.
    assert_eq!(
        body["data"]["steps"][1]["carried_conditions"][0],
        "Provide SOC 2 Type II report"
    );

    let response = post_json_auth(
        app,
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 2, "decision": "approved"}),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completed_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deferral_keeps_step_pending_for_resubmission(pool: PgPool) {
    let org = create_test_org(&pool, "wf-defer", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfd.test", OrgRole::RiskManager).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool.clone()).await;
    let (_vendor, workflow) = setup_workflow(app.clone(), &token, "wf-defer").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 1, "decision": "deferred", "comments": "Need the contract first"}),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["status"], "in_progress");

    // The deferred step is still the current one and accepts a new decision.
    let response = post_json_auth(
        app,
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token,
        json!({"step_order": 1, "decision": "approved"}),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["steps"][0]["decision"], "approved");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_role_cannot_decide(pool: PgPool) {
    let org = create_test_org(&pool, "wf-role", 5).await;
    let rm = create_test_user(&pool, org, "rm@wfr.test", OrgRole::RiskManager).await;
    let analyst = create_test_user(&pool, org, "an@wfr.test", OrgRole::Analyst).await;
    let token = token_for(&rm);
    let app = common::build_test_app(pool.clone()).await;
    let (_vendor, workflow) = setup_workflow(app.clone(), &token, "wf-role").await;

    // The analyst holds no WorkflowDecide permission at all.
    let response = post_json_auth(
        app,
        &format!("/api/v1/workflows/{workflow}/decisions"),
        &token_for(&analyst),
        json!({"step_order": 1, "decision": "approved"}),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}
