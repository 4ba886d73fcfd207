use watch_facade::migration::ControllerConfig;
use watch_facade::migration::HostPort;
use watch_facade::migration::MigrationPhase;
use watch_facade::migration::TargetInfo;
use watch_facade::params::MigrationStatus;
use watch_facade::params::NextResult;
use watch_facade::watcher::channel;

use crate::commons::session;
use crate::commons::unit_agent;
use crate::commons::FakeBackend;
use crate::commons::FakeMigration;

fn migrating_backend(ca_cert: Option<&str>) -> FakeBackend {
    FakeBackend {
        migration: Some(FakeMigration {
            id: "mig-1".to_string(),
            attempt: 3,
            phase: MigrationPhase::Reap,
            target: TargetInfo {
                controller_tag: "controller-target".to_string(),
                addrs: vec!["10.0.0.5:17070".to_string()],
                ca_cert: "CERT".to_string(),
                auth_tag: "user-admin".to_string(),
            },
        }),
        host_ports: vec![
            vec![HostPort::new("10.0.0.1", 17070)],
            vec![HostPort::new("10.0.0.2", 17070)],
        ],
        controller: ControllerConfig {
            controller_uuid: "deadbeef".to_string(),
            api_port: 17070,
            ca_cert: ca_cert.map(str::to_string),
        },
    }
}

#[tokio::test]
async fn test_migration_status_without_migration() {
    let session = session(unit_agent("mysql/0"), FakeBackend::default());
    let (tx, source) = channel::<()>(1);
    let id = session.resources().register(source).unwrap();
    tx.send(()).await.unwrap();

    let result = session.next("MigrationStatusWatcher", 1, &id).await.unwrap();

    assert_eq!(
        result,
        NextResult::MigrationStatus(MigrationStatus {
            phase: "NONE".to_string(),
            ..Default::default()
        })
    );
}

#[tokio::test]
async fn test_migration_status_with_recorded_migration() {
    let session = session(unit_agent("mysql/0"), migrating_backend(Some("SOURCE-CERT")));
    let (tx, source) = channel::<()>(1);
    let id = session.resources().register(source).unwrap();
    tx.send(()).await.unwrap();

    let result = session.next("MigrationStatusWatcher", 1, &id).await.unwrap();

    assert_eq!(
        result,
        NextResult::MigrationStatus(MigrationStatus {
            migration_id: "mig-1".to_string(),
            attempt: 3,
            phase: "REAP".to_string(),
            source_api_addrs: vec!["10.0.0.1:17070".to_string(), "10.0.0.2:17070".to_string()],
            source_ca_cert: "SOURCE-CERT".to_string(),
            target_api_addrs: vec!["10.0.0.5:17070".to_string()],
            target_ca_cert: "CERT".to_string(),
        })
    );
}

#[tokio::test]
async fn test_migration_status_missing_ca_cert() {
    let session = session(unit_agent("mysql/0"), migrating_backend(None));
    let (tx, source) = channel::<()>(2);
    let id = session.resources().register(source).unwrap();
    tx.send(()).await.unwrap();
    tx.send(()).await.unwrap();

    let err = session.next("MigrationStatusWatcher", 1, &id).await.unwrap_err();
    assert!(err.to_string().contains("missing CA cert for controller model"));

    // The watcher is still usable after a failed call.
    assert!(session
        .next("MigrationStatusWatcher", 1, &id)
        .await
        .unwrap_err()
        .to_string()
        .contains("missing CA cert"));
    assert_eq!(session.resources().count(), 1);
}

#[test]
fn test_status_serializes_in_kebab_case() {
    let status = MigrationStatus {
        phase: "NONE".to_string(),
        ..Default::default()
    };

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["phase"], "NONE");
    assert!(json.get("source-api-addrs").is_some());
}
