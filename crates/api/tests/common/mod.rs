//! Shared harness for HTTP-level integration tests.
//!
//! Mirrors the production router construction (`router::build_app_router`)
//! so tests exercise the same middleware stack, with a fixed JWT secret
//! and request helpers built on `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use veriguard_api::auth::jwt::{generate_access_token, JwtConfig};
use veriguard_api::auth::password::hash_password;
use veriguard_api::config::ServerConfig;
use veriguard_api::router::build_app_router;
use veriguard_api::state::AppState;
use veriguard_core::permissions::OrgRole;
use veriguard_core::types::DbId;
use veriguard_db::models::organization::CreateOrganization;
use veriguard_db::models::user::User;
use veriguard_db::repositories::{OrganizationRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 30,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub async fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(veriguard_events::EventBus::default()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an organization directly in the database.
pub async fn create_test_org(pool: &PgPool, subdomain: &str, seats: i32) -> DbId {
    let input = CreateOrganization {
        name: format!("{subdomain} inc"),
        subdomain: subdomain.to_string(),
        plan: Some("business".to_string()),
        seats: Some(seats),
    };
    let org = OrganizationRepo::create(pool, &input, subdomain)
        .await
        .expect("org creation should succeed");
    // Test orgs are active, not trial.
    OrganizationRepo::set_status(pool, org.id, "active")
        .await
        .expect("status update should succeed");
    org.id
}

/// Create a user directly in the database, claiming a seat like the
/// production path does. Returns the user row.
pub async fn create_test_user(pool: &PgPool, org_id: DbId, email: &str, role: OrgRole) -> User {
    OrganizationRepo::try_acquire_seat(pool, org_id)
        .await
        .expect("seat query should succeed")
        .expect("a seat should be available");

    let hashed = hash_password("test_password_123!").expect("hashing should succeed");
    UserRepo::create(pool, org_id, email, "Test User", &hashed, role.as_str(), None)
        .await
        .expect("user creation should succeed")
}

/// Mint an access token for a user with the test JWT secret.
pub fn token_for(user: &User) -> String {
    let role = OrgRole::from_str(&user.role).expect("role should parse");
    generate_access_token(
        user.id,
        user.organization_id,
        role.as_str(),
        &test_config().jwt,
    )
    .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON POST request.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON POST request with a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status code and return the parsed body.
pub async fn expect_status(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
