//! HTTP-level integration tests for tenancy: seat accounting, per-tenant
//! email uniqueness, cross-tenant isolation, and the invitation lifecycle.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_org, create_test_user, expect_status, get_auth, post_json,
    post_json_auth, token_for,
};
use serde_json::json;
use sqlx::PgPool;
use veriguard_core::permissions::OrgRole;

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn signup_creates_org_and_owner(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let body = json!({
        "organization": {"name": "Acme", "subdomain": "Acme-Corp", "seats": 10},
        "owner": {
            "email": "owner@acme.test",
            "name": "Alice Owner",
            "password": "a-long-enough-password",
            "role": "viewer"
        }
    });
    let response = post_json(app, "/api/v1/organizations", body).await;
    let body = expect_status(response, StatusCode::CREATED).await;

    // Subdomain is normalized to lowercase; requested role is overridden.
    assert_eq!(body["data"]["organization"]["subdomain"], "acme-corp");
    assert_eq!(body["data"]["organization"]["used_seats"], 1);
    assert_eq!(body["data"]["owner"]["role"], "org_owner");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_subdomain_conflicts_case_insensitively(pool: PgPool) {
    create_test_org(&pool, "taken", 5).await;
    let app = common::build_test_app(pool).await;

    let body = json!({
        "organization": {"name": "Other", "subdomain": "TAKEN"},
        "owner": {
            "email": "o@other.test",
            "name": "Other Owner",
            "password": "a-long-enough-password",
            "role": "viewer"
        }
    });
    let response = post_json(app, "/api/v1/organizations", body).await;
    expect_status(response, StatusCode::CONFLICT).await;
}

// ---------------------------------------------------------------------------
// Seat accounting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn user_creation_fails_when_seats_exhausted(pool: PgPool) {
    // Two seats: the admin takes one, the next create takes the other.
    let org = create_test_org(&pool, "fullhouse", 2).await;
    let admin = create_test_user(&pool, org, "admin@full.test", OrgRole::Admin).await;
    let token = token_for(&admin);
    let app = common::build_test_app(pool.clone()).await;

    let new_user = |email: &str| {
        json!({
            "email": email,
            "name": "Member",
            "password": "a-long-enough-password",
            "role": "viewer"
        })
    };

    // Second seat fills.
    let response =
        post_json_auth(app.clone(), "/api/v1/users", &token, new_user("b@full.test")).await;
    expect_status(response, StatusCode::CREATED).await;

    // Third user: no seats left, 409, and no row is written.
    let response =
        post_json_auth(app.clone(), "/api/v1/users", &token, new_user("c@full.test")).await;
    expect_status(response, StatusCode::CONFLICT).await;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE organization_id = $1")
            .bind(org)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 2, "failed create must not write a user");

    let used: i32 = sqlx::query_scalar("SELECT used_seats FROM organizations WHERE id = $1")
        .bind(org)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(used, 2, "failed create must not leak a seat");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_duplicate_email_releases_seat(pool: PgPool) {
    let org = create_test_org(&pool, "dupemail", 5).await;
    let admin = create_test_user(&pool, org, "admin@dup.test", OrgRole::Admin).await;
    let token = token_for(&admin);
    let app = common::build_test_app(pool.clone()).await;

    let body = json!({
        "email": "admin@dup.test",
        "name": "Duplicate",
        "password": "a-long-enough-password",
        "role": "viewer"
    });
    let response = post_json_auth(app, "/api/v1/users", &token, body).await;
    expect_status(response, StatusCode::CONFLICT).await;

    let used: i32 = sqlx::query_scalar("SELECT used_seats FROM organizations WHERE id = $1")
        .bind(org)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(used, 1, "the seat claimed for the failed create must be released");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivating_user_releases_seat(pool: PgPool) {
    let org = create_test_org(&pool, "release", 5).await;
    let admin = create_test_user(&pool, org, "admin@rel.test", OrgRole::Admin).await;
    let member = create_test_user(&pool, org, "member@rel.test", OrgRole::Viewer).await;
    let token = token_for(&admin);
    let app = common::build_test_app(pool.clone()).await;

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/users/{}", member.id))
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let used: i32 = sqlx::query_scalar("SELECT used_seats FROM organizations WHERE id = $1")
        .bind(org)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(used, 1);
}

// ---------------------------------------------------------------------------
// Per-tenant email uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn same_email_allowed_in_different_tenants(pool: PgPool) {
    let org_a = create_test_org(&pool, "tenant-a", 5).await;
    let org_b = create_test_org(&pool, "tenant-b", 5).await;

    create_test_user(&pool, org_a, "shared@example.test", OrgRole::Admin).await;
    // The same address in another tenant must not conflict.
    create_test_user(&pool, org_b, "shared@example.test", OrgRole::Admin).await;
}

// ---------------------------------------------------------------------------
// Cross-tenant isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cross_tenant_user_lookup_is_not_found(pool: PgPool) {
    let org_a = create_test_org(&pool, "iso-a", 5).await;
    let org_b = create_test_org(&pool, "iso-b", 5).await;
    let user_a = create_test_user(&pool, org_a, "a@iso.test", OrgRole::Admin).await;
    let admin_b = create_test_user(&pool, org_b, "b@iso.test", OrgRole::Admin).await;
    let app = common::build_test_app(pool).await;

    // The id exists, but in another tenant: 404, never 403.
    let response = get_auth(
        app,
        &format!("/api/v1/users/{}", user_a.id),
        &token_for(&admin_b),
    )
    .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cross_tenant_org_access_is_forbidden(pool: PgPool) {
    let org_a = create_test_org(&pool, "wall-a", 5).await;
    let org_b = create_test_org(&pool, "wall-b", 5).await;
    // Even an org_owner holds nothing outside their own tenant.
    let owner_b = create_test_user(&pool, org_b, "owner@wallb.test", OrgRole::OrgOwner).await;
    let app = common::build_test_app(pool).await;

    let response = get_auth(
        app,
        &format!("/api/v1/organizations/{org_a}"),
        &token_for(&owner_b),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn invitation_accept_is_single_use(pool: PgPool) {
    let org = create_test_org(&pool, "invite", 5).await;
    let admin = create_test_user(&pool, org, "admin@inv.test", OrgRole::Admin).await;
    let token = token_for(&admin);
    let app = common::build_test_app(pool.clone()).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/invitations",
        &token,
        json!({"email": "newbie@inv.test", "role": "analyst"}),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let invite_token = body["data"]["token"].as_str().unwrap().to_string();

    let accept = json!({
        "token": invite_token,
        "name": "New Analyst",
        "password": "a-long-enough-password"
    });

    // First accept succeeds and creates the user with the invited role.
    let response =
        post_json(app.clone(), "/api/v1/invitations/accept", accept.clone()).await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["role"], "analyst");
    assert_eq!(body["data"]["email"], "newbie@inv.test");

    // Second accept with the same token fails: no longer pending.
    let response = post_json(app, "/api/v1/invitations/accept", accept).await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invitation_into_full_org_fails(pool: PgPool) {
    let org = create_test_org(&pool, "invfull", 1).await;
    let admin = create_test_user(&pool, org, "admin@invfull.test", OrgRole::Admin).await;
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app,
        "/api/v1/invitations",
        &token_for(&admin),
        json!({"email": "late@invfull.test", "role": "viewer"}),
    )
    .await;
    expect_status(response, StatusCode::CONFLICT).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn suspended_org_refuses_new_members(pool: PgPool) {
    let org = create_test_org(&pool, "frozen", 5).await;
    let admin = create_test_user(&pool, org, "admin@frozen.test", OrgRole::Admin).await;
    veriguard_db::repositories::OrganizationRepo::set_status(&pool, org, "suspended")
        .await
        .unwrap();
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app,
        "/api/v1/users",
        &token_for(&admin),
        json!({
            "email": "x@frozen.test",
            "name": "Late",
            "password": "a-long-enough-password",
            "role": "viewer"
        }),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Permission matrix over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn viewer_cannot_create_vendor(pool: PgPool) {
    let org = create_test_org(&pool, "rbac", 5).await;
    let viewer = create_test_user(&pool, org, "viewer@rbac.test", OrgRole::Viewer).await;
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app,
        "/api/v1/vendors",
        &token_for(&viewer),
        json!({"name": "Nope Corp", "tier": "low"}),
    )
    .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let response = common::get(app, "/api/v1/vendors").await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}
