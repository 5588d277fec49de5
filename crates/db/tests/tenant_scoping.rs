//! Integration tests for tenant scoping, seat accounting, invitation
//! consumption, and task ordering at the repository layer.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use veriguard_core::types::DbId;
use veriguard_db::models::organization::CreateOrganization;
use veriguard_db::models::task::CreateTask;
use veriguard_db::models::vendor::CreateVendor;
use veriguard_db::repositories::{
    InvitationRepo, OrganizationRepo, TaskRepo, UserRepo, VendorRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_org(pool: &PgPool, subdomain: &str, seats: i32) -> DbId {
    let input = CreateOrganization {
        name: subdomain.to_string(),
        subdomain: subdomain.to_string(),
        plan: None,
        seats: Some(seats),
    };
    OrganizationRepo::create(pool, &input, subdomain)
        .await
        .expect("org creation should succeed")
        .id
}

async fn new_user(pool: &PgPool, org_id: DbId, email: &str) -> DbId {
    UserRepo::create(pool, org_id, email, "User", "hash", "viewer", None)
        .await
        .expect("user creation should succeed")
        .id
}

fn new_vendor(name: &str) -> CreateVendor {
    CreateVendor {
        name: name.to_string(),
        category: None,
        tier: "medium".to_string(),
        inherent_risk_score: None,
        contacts: serde_json::json!([]),
        data_processing_locations: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tenant scoping
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn scoped_lookup_hides_other_tenants(pool: PgPool) {
    let org_a = new_org(&pool, "scope-a", 5).await;
    let org_b = new_org(&pool, "scope-b", 5).await;

    let user_a = new_user(&pool, org_a, "a@scope.test").await;
    let vendor_a = VendorRepo::create(&pool, org_a, &new_vendor("A-side vendor"))
        .await
        .unwrap();

    // Same id, own tenant: found.
    assert!(UserRepo::find_scoped(&pool, user_a, org_a).await.unwrap().is_some());
    assert!(VendorRepo::find_scoped(&pool, vendor_a.id, org_a).await.unwrap().is_some());

    // Same id, other tenant: not found.
    assert!(UserRepo::find_scoped(&pool, user_a, org_b).await.unwrap().is_none());
    assert!(VendorRepo::find_scoped(&pool, vendor_a.id, org_b).await.unwrap().is_none());
}

#[sqlx::test]
async fn email_unique_per_tenant_only(pool: PgPool) {
    let org_a = new_org(&pool, "mail-a", 5).await;
    let org_b = new_org(&pool, "mail-b", 5).await;

    new_user(&pool, org_a, "same@mail.test").await;
    // Another tenant may reuse the address.
    new_user(&pool, org_b, "same@mail.test").await;

    // The same tenant may not.
    let dup = UserRepo::create(&pool, org_a, "same@mail.test", "Dup", "hash", "viewer", None).await;
    assert!(dup.is_err());
}

// ---------------------------------------------------------------------------
// Seat accounting
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn seat_acquisition_stops_at_capacity(pool: PgPool) {
    let org = new_org(&pool, "seats", 2).await;

    assert!(OrganizationRepo::try_acquire_seat(&pool, org).await.unwrap().is_some());
    assert!(OrganizationRepo::try_acquire_seat(&pool, org).await.unwrap().is_some());
    // Third claim: full.
    assert!(OrganizationRepo::try_acquire_seat(&pool, org).await.unwrap().is_none());
    assert!(!OrganizationRepo::has_available_seats(&pool, org).await.unwrap());
}

#[sqlx::test]
async fn seat_release_clamps_at_zero(pool: PgPool) {
    let org = new_org(&pool, "clamp", 2).await;

    // Releasing with zero used seats must not go negative.
    OrganizationRepo::release_seat(&pool, org).await.unwrap();
    let used: i32 = sqlx::query_scalar("SELECT used_seats FROM organizations WHERE id = $1")
        .bind(org)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(used, 0);
}

// ---------------------------------------------------------------------------
// Invitation consumption
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn invitation_accepts_exactly_once(pool: PgPool) {
    let org = new_org(&pool, "once", 5).await;
    let invitation = InvitationRepo::create(
        &pool,
        org,
        "one@once.test",
        "viewer",
        "token-once",
        None,
        Utc::now() + Duration::days(7),
    )
    .await
    .unwrap();

    let first = InvitationRepo::mark_accepted(&pool, invitation.id).await.unwrap();
    assert!(first.is_some());
    assert_eq!(first.unwrap().status, "accepted");

    // The pending-status guard refuses the second consumption.
    let second = InvitationRepo::mark_accepted(&pool, invitation.id).await.unwrap();
    assert!(second.is_none());
}

#[sqlx::test]
async fn lapsed_invitations_are_swept(pool: PgPool) {
    let org = new_org(&pool, "sweep", 5).await;
    InvitationRepo::create(
        &pool,
        org,
        "old@sweep.test",
        "viewer",
        "token-old",
        None,
        Utc::now() - Duration::days(1),
    )
    .await
    .unwrap();

    let expired = InvitationRepo::expire_lapsed(&pool, Utc::now()).await.unwrap();
    assert_eq!(expired, 1);

    let invitation = InvitationRepo::find_by_token(&pool, "token-old")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, "expired");
}

// ---------------------------------------------------------------------------
// Task ordering and overdue
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn tasks_order_by_priority_then_due_date(pool: PgPool) {
    let org = new_org(&pool, "order", 5).await;
    let d1 = Utc::now() + Duration::days(1);
    let d2 = Utc::now() + Duration::days(2);

    let task = |title: &str, priority: &str, due| CreateTask {
        title: title.to_string(),
        description: None,
        assigned_to: None,
        due_date: due,
        priority: Some(priority.to_string()),
        related_vendor_id: None,
    };

    TaskRepo::create(&pool, org, None, &task("low", "low", Some(d1))).await.unwrap();
    TaskRepo::create(&pool, org, None, &task("high-late", "high", Some(d2))).await.unwrap();
    TaskRepo::create(&pool, org, None, &task("high-early", "high", Some(d1))).await.unwrap();
    TaskRepo::create(&pool, org, None, &task("critical", "critical", None)).await.unwrap();

    let tasks = TaskRepo::list_for_org(&pool, org, None, None, 50, 0).await.unwrap();
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["critical", "high-early", "high-late", "low"]);
}

#[sqlx::test]
async fn overdue_is_computed_at_query_time(pool: PgPool) {
    let org = new_org(&pool, "overdue", 5).await;
    let past = Utc::now() - Duration::hours(1);
    let future = Utc::now() + Duration::hours(1);

    let task = |title: &str, due| CreateTask {
        title: title.to_string(),
        description: None,
        assigned_to: None,
        due_date: Some(due),
        priority: None,
        related_vendor_id: None,
    };

    let late = TaskRepo::create(&pool, org, None, &task("late", past)).await.unwrap();
    TaskRepo::create(&pool, org, None, &task("on-time", future)).await.unwrap();
    let done = TaskRepo::create(&pool, org, None, &task("done-late", past)).await.unwrap();
    TaskRepo::update(
        &pool,
        done.id,
        org,
        &veriguard_db::models::task::UpdateTask {
            title: None,
            description: None,
            assigned_to: None,
            due_date: None,
            priority: None,
            status: Some("completed".to_string()),
        },
    )
    .await
    .unwrap();

    let overdue = TaskRepo::list_overdue(&pool, org).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late.id);
}
