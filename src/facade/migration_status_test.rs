use std::sync::Arc;

use super::*;
use crate::migration::ControllerConfig;
use crate::migration::HostPort;
use crate::migration::MigrationPhase;
use crate::migration::MockMigrationBackend;
use crate::migration::MockModelMigration;
use crate::migration::ModelMigration;
use crate::migration::TargetInfo;
use crate::params::MigrationStatus;
use crate::resources::Resources;
use crate::test_utils::client;
use crate::test_utils::enable_logger;
use crate::test_utils::unit_agent;
use crate::watcher::channel;
use crate::watcher::ChangeSender;
use crate::BackendError;

async fn signalled_watcher(backend: MockMigrationBackend) -> (ChangeSender<()>, MigrationStatusWatcher) {
    enable_logger();
    let resources = Arc::new(Resources::new());
    let (tx, source) = channel::<()>(4);
    let id = resources.register(source).unwrap();
    tx.send(()).await.unwrap();

    let watcher =
        MigrationStatusWatcher::new(&Context::new(id, unit_agent(), resources), Arc::new(backend)).unwrap();
    (tx, watcher)
}

fn recorded_migration() -> MockModelMigration {
    let mut migration = MockModelMigration::new();
    migration.expect_id().returning(|| "mig-1".to_string());
    migration.expect_attempt().returning(|| 3);
    migration.expect_phase().returning(|| Ok(MigrationPhase::Reap));
    migration.expect_target_info().returning(|| {
        Ok(TargetInfo {
            controller_tag: "controller-target".to_string(),
            addrs: vec!["10.0.0.5:17070".to_string()],
            ca_cert: "CERT".to_string(),
            auth_tag: "user-admin".to_string(),
        })
    });
    migration
}

fn backend_with(migration: MockModelMigration) -> MockMigrationBackend {
    let mut backend = MockMigrationBackend::new();
    backend
        .expect_latest_migration()
        .return_once(move || Ok(Box::new(migration) as Box<dyn ModelMigration>));
    backend
}

fn two_host_port_sections() -> Vec<Vec<HostPort>> {
    vec![
        vec![HostPort::new("10.0.0.1", 17070), HostPort::new("::1", 17070)],
        vec![HostPort::new("10.0.0.2", 17070)],
    ]
}

fn controller_config(ca_cert: Option<&str>) -> ControllerConfig {
    ControllerConfig {
        controller_uuid: "deadbeef".to_string(),
        api_port: 17070,
        ca_cert: ca_cert.map(str::to_string),
    }
}

#[tokio::test]
async fn test_no_migration_reports_phase_none() {
    let mut backend = MockMigrationBackend::new();
    backend
        .expect_latest_migration()
        .returning(|| Err(BackendError::NotFound("migration".to_string()).into()));
    backend.expect_api_host_ports().never();
    backend.expect_controller_config().never();
    let (_tx, watcher) = signalled_watcher(backend).await;

    let status = watcher.next().await.unwrap();

    assert_eq!(
        status,
        MigrationStatus {
            phase: "NONE".to_string(),
            ..Default::default()
        }
    );
}

#[tokio::test]
async fn test_recorded_migration_is_fully_populated() {
    let mut backend = backend_with(recorded_migration());
    backend.expect_api_host_ports().returning(|| Ok(two_host_port_sections()));
    backend
        .expect_controller_config()
        .returning(|| Ok(controller_config(Some("SOURCE-CERT"))));
    let (_tx, watcher) = signalled_watcher(backend).await;

    let status = watcher.next().await.unwrap();

    assert_eq!(
        status,
        MigrationStatus {
            migration_id: "mig-1".to_string(),
            attempt: 3,
            phase: "REAP".to_string(),
            source_api_addrs: vec![
                "10.0.0.1:17070".to_string(),
                "[::1]:17070".to_string(),
                "10.0.0.2:17070".to_string(),
            ],
            source_ca_cert: "SOURCE-CERT".to_string(),
            target_api_addrs: vec!["10.0.0.5:17070".to_string()],
            target_ca_cert: "CERT".to_string(),
        }
    );
}

#[tokio::test]
async fn test_missing_ca_cert_fails_the_call() {
    let mut backend = backend_with(recorded_migration());
    backend.expect_api_host_ports().returning(|| Ok(two_host_port_sections()));
    backend.expect_controller_config().returning(|| Ok(controller_config(None)));
    let (_tx, watcher) = signalled_watcher(backend).await;

    let err = watcher.next().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "retrieving source CA cert: missing CA cert for controller model"
    );
    assert!(!err.is_stopped_watcher());
}

#[tokio::test]
async fn test_lookup_failure_is_annotated() {
    let mut backend = MockMigrationBackend::new();
    backend
        .expect_latest_migration()
        .returning(|| Err(BackendError::Unavailable("mongo".to_string()).into()));
    let (_tx, watcher) = signalled_watcher(backend).await;

    let err = watcher.next().await.unwrap_err();

    assert_eq!(err.to_string(), "migration lookup: backend unavailable: mongo");
}

#[tokio::test]
async fn test_each_step_failure_names_the_step() {
    let mut migration = MockModelMigration::new();
    migration
        .expect_phase()
        .returning(|| Err(BackendError::Other("phase doc gone".to_string()).into()));
    let (_tx, watcher) = signalled_watcher(backend_with(migration)).await;
    assert_eq!(
        watcher.next().await.unwrap_err().to_string(),
        "retrieving migration phase: phase doc gone"
    );

    let mut backend = backend_with(recorded_migration());
    backend
        .expect_api_host_ports()
        .returning(|| Err(BackendError::Other("no addresses".to_string()).into()));
    let (_tx, watcher) = signalled_watcher(backend).await;
    assert_eq!(
        watcher.next().await.unwrap_err().to_string(),
        "retrieving source addresses: no addresses"
    );

    let mut migration = MockModelMigration::new();
    migration.expect_phase().returning(|| Ok(MigrationPhase::Quiesce));
    migration
        .expect_target_info()
        .returning(|| Err(BackendError::Other("target doc gone".to_string()).into()));
    let mut backend = backend_with(migration);
    backend.expect_api_host_ports().returning(|| Ok(vec![]));
    backend
        .expect_controller_config()
        .returning(|| Ok(controller_config(Some("CERT"))));
    let (_tx, watcher) = signalled_watcher(backend).await;
    assert_eq!(
        watcher.next().await.unwrap_err().to_string(),
        "retrieving target info: target doc gone"
    );
}

#[tokio::test]
async fn test_failed_call_leaves_watcher_usable() {
    let mut backend = MockMigrationBackend::new();
    let mut calls = 0;
    backend.expect_latest_migration().times(2).returning(move || {
        calls += 1;
        if calls == 1 {
            Err(BackendError::Unavailable("mongo".to_string()).into())
        } else {
            Err(BackendError::NotFound("migration".to_string()).into())
        }
    });
    let (tx, watcher) = signalled_watcher(backend).await;
    tx.send(()).await.unwrap();

    assert!(watcher.next().await.is_err());
    assert_eq!(watcher.next().await.unwrap().phase, "NONE");
}

#[tokio::test]
async fn test_closed_source_skips_backend() {
    let mut backend = MockMigrationBackend::new();
    backend.expect_latest_migration().never();
    let resources = Arc::new(Resources::new());
    let (tx, source) = channel::<()>(1);
    let id = resources.register(source).unwrap();
    tx.close();

    let watcher =
        MigrationStatusWatcher::new(&Context::new(id, unit_agent(), resources), Arc::new(backend)).unwrap();

    assert!(watcher.next().await.unwrap_err().is_stopped_watcher());
}

#[tokio::test]
async fn test_requires_agent() {
    let resources = Arc::new(Resources::new());
    let (_tx, source) = channel::<()>(1);
    let id = resources.register(source).unwrap();

    let err = MigrationStatusWatcher::new(
        &Context::new(id, client(), resources),
        Arc::new(MockMigrationBackend::new()),
    )
    .unwrap_err();

    assert!(err.is_permission_denied());
}

#[test]
fn test_missing_or_mistyped_resource_is_unknown_watcher() {
    enable_logger();
    let resources = Arc::new(Resources::new());
    let (_tx, source) = channel::<Vec<String>>(1);
    let strings_id = resources.register(source).unwrap();

    let err = MigrationStatusWatcher::new(
        &Context::new("42", unit_agent(), resources.clone()),
        Arc::new(MockMigrationBackend::new()),
    )
    .unwrap_err();
    assert!(err.is_unknown_watcher());

    let err = MigrationStatusWatcher::new(
        &Context::new(strings_id, unit_agent(), resources.clone()),
        Arc::new(MockMigrationBackend::new()),
    )
    .unwrap_err();
    assert!(err.is_unknown_watcher());

    assert_eq!(resources.count(), 1);
}
