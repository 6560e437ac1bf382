//! End-to-end tests for the database user strategy

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use keywheel_rotation::prelude::*;
use keywheel_rotation::testing::{
    database_user_resource, test_clock, MockDatabaseClient, MockSecretStore,
};

const ADMIN_SECRET: &str = "db1-admin";
const HOSTNAME: &str = "db1.example.net";

struct Harness {
    registry: StrategyRegistry,
    store: Arc<MockSecretStore>,
    database: Arc<MockDatabaseClient>,
    context: OperationContext,
    resource: ResourceConfig,
    token: CancellationToken,
}

fn harness(roles: &[&str]) -> Harness {
    let clock = test_clock();
    let store = Arc::new(MockSecretStore::with_clock("m", clock.clone()));
    let database = Arc::new(MockDatabaseClient::new());

    let registry = StrategyRegistry::with_clock(clock.clone());
    registry.register(Arc::new(DatabaseUserRotator::new(
        database.clone(),
        clock.clone(),
    )));

    let context = OperationContext::new().with_store("m", store.clone());

    Harness {
        registry,
        store,
        database,
        context,
        resource: database_user_resource("app-user", "m", ADMIN_SECRET, HOSTNAME, roles),
        token: CancellationToken::new(),
    }
}

async fn seed_admin_secret(store: &MockSecretStore) {
    store
        .seed(
            ADMIN_SECRET,
            format!(r#"{{"hostname":"{HOSTNAME}","username":"padmin","password":"adminpw"}}"#),
            None,
            "application/json",
        )
        .await;
}

#[tokio::test]
async fn test_initialize_creates_user_and_stores_credential() {
    let h = harness(&["app_read", "app_write"]);
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(verdict.was_rotated, "{}", verdict.notes);
    assert_eq!(h.database.connections(), vec![format!("padmin@{HOSTNAME}")]);

    let statements = h.database.statements();
    assert_eq!(statements.len(), 1);
    let statement = &statements[0];

    let raw = h.store.get_secret_value("app-user").await.unwrap().unwrap();
    let credential = DatabaseCredential::from_json(raw.expose()).unwrap();
    assert_eq!(credential.hostname, HOSTNAME);
    assert!(credential.username.starts_with('u'));
    assert_eq!(credential.username.len(), 16);
    assert_eq!(credential.password.expose().len(), 24);

    // The statement carries the generated identity, quoted roles, and the
    // expiration handed to the store
    assert!(statement.contains(&format!("CREATE USER \"{}\"", credential.username)));
    assert!(statement.contains(credential.password.expose()));
    assert!(statement.contains("IN ROLE \"app_read\", \"app_write\""));
    assert!(statement.contains("VALID UNTIL '2025-08-30T00:00:00Z'"));

    let info = h.store.get_secret("app-user").await.unwrap().unwrap();
    assert_eq!(info.content_type, "application/json");
    assert_eq!(
        info.expires_on,
        Some(Utc.with_ymd_and_hms(2025, 8, 30, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_empty_role_list_omits_membership_clause() {
    let h = harness(&[]);
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(verdict.was_rotated);
    let statements = h.database.statements();
    assert!(!statements[0].contains("IN ROLE"));
}

#[tokio::test]
async fn test_invalid_role_skips_before_any_connection() {
    let h = harness(&["good", "bad name"]);
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert!(verdict.notes.contains("Invalid role"));
    assert!(verdict.notes.contains("bad name"));
    assert_eq!(h.database.execute_count(), 0);
    assert_eq!(h.database.verify_count(), 0);
    assert_eq!(h.store.update_count(), 0);
}

#[tokio::test]
async fn test_missing_admin_secret_skips_with_note() {
    let h = harness(&["app_read"]);

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert!(verdict.notes.contains(ADMIN_SECRET));
    assert_eq!(h.database.execute_count(), 0);
}

#[tokio::test]
async fn test_malformed_admin_secret_skips_with_note() {
    let h = harness(&["app_read"]);
    h.store
        .seed(ADMIN_SECRET, "not json at all", None, "application/json")
        .await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert!(verdict.notes.contains("malformed"));
    assert_eq!(h.database.execute_count(), 0);
}

#[tokio::test]
async fn test_missing_database_user_config_is_a_verdict() {
    let mut h = harness(&[]);
    h.resource.database_user = None;
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert!(verdict.notes.contains("No database user settings"));
}

#[tokio::test]
async fn test_what_if_verifies_connectivity_without_ddl() {
    let h = harness(&["app_read"]);
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new().what_if(), &h.token)
        .await;

    assert!(verdict.was_rotated);
    assert!(verdict.notes.contains("Would have"));
    assert_eq!(h.database.verify_count(), 1);
    assert_eq!(h.database.execute_count(), 0);
    assert_eq!(h.store.update_count(), 0);
}

#[tokio::test]
async fn test_ddl_failure_leaves_store_untouched() {
    let h = harness(&["app_read"]);
    seed_admin_secret(&h.store).await;
    h.database.fail_next_execute();

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert_eq!(h.store.update_count(), 0);
}

#[tokio::test]
async fn test_store_failure_after_ddl_demands_reinitialization() {
    let h = harness(&["app_read"]);
    seed_admin_secret(&h.store).await;
    h.store.fail_next_update();

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;

    assert!(!verdict.was_rotated);
    assert!(verdict.notes.contains("re-initialization will be required"));
    // The user was created server-side before the store write failed
    assert_eq!(h.database.execute_count(), 1);
}

#[tokio::test]
async fn test_successive_rotations_issue_distinct_users() {
    let h = harness(&["app_read"]);
    seed_admin_secret(&h.store).await;

    let verdict = h
        .registry
        .initialize(&h.resource, &h.context, &RotationFlags::new(), &h.token)
        .await;
    assert!(verdict.was_rotated);

    let first = DatabaseCredential::from_json(
        h.store
            .get_secret_value("app-user")
            .await
            .unwrap()
            .unwrap()
            .expose(),
    )
    .unwrap();

    // The previous user is untouched server-side; a new one appears
    let verdict = h
        .registry
        .rotate(&h.resource, &h.context, &RotationFlags::new().force(), &h.token)
        .await;
    assert!(verdict.was_rotated);

    let second = DatabaseCredential::from_json(
        h.store
            .get_secret_value("app-user")
            .await
            .unwrap()
            .unwrap()
            .expose(),
    )
    .unwrap();

    assert_ne!(first.username, second.username);
    assert_eq!(h.database.statements().len(), 2);
    assert!(h.database.statements()[0].contains(&first.username));
    assert!(h.database.statements()[1].contains(&second.username));
}
