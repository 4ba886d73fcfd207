use std::time::Duration;

use tokio::time::timeout;
use watch_facade::params::MachineStorageId;
use watch_facade::params::MachineStorageIdsWatchResult;
use watch_facade::params::NextResult;
use watch_facade::params::StringsWatchResult;
use watch_facade::watcher::channel;

use crate::commons::session;
use crate::commons::unit_agent;
use crate::commons::user;
use crate::commons::FakeBackend;

#[tokio::test]
async fn test_unit_agent_strings_watcher_end_to_end() {
    let session = session(unit_agent("mysql/0"), FakeBackend::default());
    let (tx, source) = channel::<Vec<String>>(1);
    let id = session.resources().register(source).unwrap();
    tx.send(vec!["unit-a".to_string()]).await.unwrap();

    let first = session.next("StringsWatcher", 1, &id).await.unwrap();
    assert_eq!(
        first,
        NextResult::Strings(StringsWatchResult {
            changes: vec!["unit-a".to_string()],
        })
    );

    tx.close();
    let err = session.next("StringsWatcher", 1, &id).await.unwrap_err();
    assert!(err.is_stopped_watcher());

    let status: tonic::Status = err.into();
    assert_eq!(status.code(), tonic::Code::Cancelled);
}

#[tokio::test]
async fn test_volume_attachments_survive_a_bad_batch() {
    let session = session(unit_agent("mysql/0"), FakeBackend::default());
    let (tx, source) = channel::<Vec<String>>(2);
    let id = session.resources().register(source).unwrap();
    tx.send(vec!["garbage".to_string()]).await.unwrap();
    tx.send(vec!["0:0/1".to_string()]).await.unwrap();

    assert!(session.next("VolumeAttachmentsWatcher", 2, &id).await.is_err());
    assert_eq!(
        session.next("VolumeAttachmentsWatcher", 2, &id).await.unwrap(),
        NextResult::MachineStorageIds(MachineStorageIdsWatchResult {
            changes: vec![MachineStorageId {
                machine_tag: "machine-0".to_string(),
                attachment_tag: "volume-0-1".to_string(),
            }],
        })
    );
}

#[tokio::test]
async fn test_user_cannot_read_agent_watchers() {
    let session = session(user("admin"), FakeBackend::default());
    let (_tx, source) = channel::<()>(1);
    let id = session.resources().register(source).unwrap();

    let err = session.next("NotifyWatcher", 1, &id).await.unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(session.resources().count(), 1);

    let status: tonic::Status = err.into();
    assert_eq!(status.code(), tonic::Code::PermissionDenied);
}

#[tokio::test]
async fn test_close_releases_a_blocked_next() {
    let session = std::sync::Arc::new(session(unit_agent("mysql/0"), FakeBackend::default()));
    let (tx, source) = channel::<()>(1);
    let id = session.resources().register(source).unwrap();

    let pending = {
        let session = session.clone();
        let id = id.clone();
        tokio::spawn(async move { session.next("NotifyWatcher", 1, &id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(session.close(), 1);

    let result = timeout(Duration::from_millis(200), pending).await.unwrap().unwrap();
    assert!(result.unwrap_err().is_stopped_watcher());
    assert!(tx.is_stopped());
}

#[tokio::test]
async fn test_metrics_exposition_includes_served_facades() {
    let session = session(unit_agent("mysql/0"), FakeBackend::default());
    let (tx, source) = channel::<()>(1);
    let id = session.resources().register(source).unwrap();
    tx.send(()).await.unwrap();

    session.next("NotifyWatcher", 1, &id).await.unwrap();

    let text = watch_facade::metrics::gather();
    assert!(text.contains("watcher_next_calls"));
    assert!(text.contains("NotifyWatcher"));
}
