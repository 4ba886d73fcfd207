use std::sync::Arc;

use tracing::debug;
use tracing::trace;

use super::Context;
use super::WatcherCommon;
use crate::auth::AuthRequirement;
use crate::names::MapChangesFn;
use crate::params::AllWatcherNextResults;
use crate::params::EntitiesWatchResult;
use crate::params::MachineStorageIdsWatchResult;
use crate::params::RelationUnitsWatchResult;
use crate::params::RemoteApplicationWatchResult;
use crate::params::RemoteRelationsWatchResult;
use crate::params::StringsWatchResult;
use crate::resources::AllDeltasSource;
use crate::resources::RelationUnitsSource;
use crate::resources::RemoteApplicationSource;
use crate::resources::RemoteRelationsSource;
use crate::storage::parse_filesystem_attachment_ids;
use crate::storage::parse_volume_attachment_ids;
use crate::storage::AttachmentIdParser;
use crate::watcher::ChangeSource;
use crate::watcher::NotifySource;
use crate::watcher::StringsSource;
use crate::Result;

/// Blocks for one change and shapes it into a wire result.
///
/// A closed source yields its stored error, or `StoppedWatcher`. Errors
/// returned by `shape` leave the source active.
pub(crate) async fn next_change<T, R>(
    id: &str,
    source: &ChangeSource<T>,
    shape: impl FnOnce(T) -> Result<R>,
) -> Result<R> {
    match source.next().await {
        Some(change) => {
            trace!(watcher_id = %id, "shaping change");
            shape(change)
        }
        None => {
            let err = source.terminal_error();
            debug!(watcher_id = %id, error = %err, "watcher terminated");
            Err(err)
        }
    }
}

/// Model-wide deltas; serves both `AllWatcher` and `AllModelWatcher`.
#[derive(Debug, Clone)]
pub struct AllWatcher {
    common: WatcherCommon,
    source: Arc<AllDeltasSource>,
}

impl AllWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        // The resource itself was created by a call that already checked
        // model or controller access.
        let source = context.resolve(AuthRequirement::Client, "AllWatcher", |r| r.as_all_deltas())?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    pub async fn next(&self) -> Result<AllWatcherNextResults> {
        next_change(self.common.id(), &self.source, |deltas| Ok(AllWatcherNextResults { deltas })).await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

#[derive(Debug, Clone)]
pub struct NotifyWatcher {
    common: WatcherCommon,
    source: Arc<NotifySource>,
}

impl NotifyWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Agent, "NotifyWatcher", |r| r.as_notify())?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    /// Returns once something changed.
    pub async fn next(&self) -> Result<()> {
        next_change(self.common.id(), &self.source, Ok).await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

#[derive(Debug, Clone)]
pub struct StringsWatcher {
    common: WatcherCommon,
    source: Arc<StringsSource>,
}

impl StringsWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Agent, "StringsWatcher", |r| r.as_strings())?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    pub async fn next(&self) -> Result<StringsWatchResult> {
        next_change(self.common.id(), &self.source, |changes| Ok(StringsWatchResult { changes })).await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

#[derive(Debug, Clone)]
pub struct RelationUnitsWatcher {
    common: WatcherCommon,
    source: Arc<RelationUnitsSource>,
}

impl RelationUnitsWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Agent, "RelationUnitsWatcher", |r| {
            r.as_relation_units()
        })?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    pub async fn next(&self) -> Result<RelationUnitsWatchResult> {
        next_change(self.common.id(), &self.source, |changes| {
            Ok(RelationUnitsWatchResult { changes })
        })
        .await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

/// Reports the current state of one remote application per change.
#[derive(Debug, Clone)]
pub struct RemoteApplicationWatcher {
    common: WatcherCommon,
    source: Arc<RemoteApplicationSource>,
}

impl RemoteApplicationWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Controller, "RemoteApplicationWatcher", |r| {
            r.as_remote_application()
        })?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    pub async fn next(&self) -> Result<RemoteApplicationWatchResult> {
        next_change(self.common.id(), &self.source, |change| {
            Ok(RemoteApplicationWatchResult { change: Some(change) })
        })
        .await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

#[derive(Debug, Clone)]
pub struct RemoteRelationsWatcher {
    common: WatcherCommon,
    source: Arc<RemoteRelationsSource>,
}

impl RemoteRelationsWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Controller, "RemoteRelationsWatcher", |r| {
            r.as_remote_relations()
        })?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
        })
    }

    pub async fn next(&self) -> Result<RemoteRelationsWatchResult> {
        next_change(self.common.id(), &self.source, |change| {
            Ok(RemoteRelationsWatchResult { change: Some(change) })
        })
        .await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

/// Storage attachments of machines, parsed from raw attachment ids
#[derive(Clone)]
pub struct MachineStorageIdsWatcher {
    common: WatcherCommon,
    source: Arc<StringsSource>,
    parser: AttachmentIdParser,
}

impl MachineStorageIdsWatcher {
    pub fn new(
        context: &Context,
        parser: AttachmentIdParser,
    ) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Agent, "MachineStorageIdsWatcher", |r| {
            r.as_strings()
        })?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
            parser,
        })
    }

    pub fn volume_attachments(context: &Context) -> Result<Self> {
        Self::new(context, parse_volume_attachment_ids)
    }

    pub fn filesystem_attachments(context: &Context) -> Result<Self> {
        Self::new(context, parse_filesystem_attachment_ids)
    }

    pub async fn next(&self) -> Result<MachineStorageIdsWatchResult> {
        let parser = self.parser;
        next_change(self.common.id(), &self.source, |ids| {
            let changes = parser(&ids).map_err(|e| e.annotate("cannot parse attachment ids"))?;
            Ok(MachineStorageIdsWatchResult { changes })
        })
        .await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

/// Raw entity ids mapped to tags by the resource's mapping function
#[derive(Clone)]
pub struct EntitiesWatcher {
    common: WatcherCommon,
    source: Arc<StringsSource>,
    map_changes: MapChangesFn,
}

impl EntitiesWatcher {
    pub fn new(context: &Context) -> Result<Self> {
        let entities = context.resolve(AuthRequirement::Agent, "EntitiesWatcher", |r| r.as_entities())?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source: entities.source,
            map_changes: entities.map_changes,
        })
    }

    pub async fn next(&self) -> Result<EntitiesWatchResult> {
        next_change(self.common.id(), &self.source, |ids| {
            let changes = (self.map_changes)(ids).map_err(|e| e.annotate("cannot map changes"))?;
            Ok(EntitiesWatchResult { changes })
        })
        .await
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

impl std::fmt::Debug for MachineStorageIdsWatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MachineStorageIdsWatcher")
            .field("common", &self.common)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for EntitiesWatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EntitiesWatcher")
            .field("common", &self.common)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
