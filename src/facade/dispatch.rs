use super::AllWatcher;
use super::EntitiesWatcher;
use super::MachineStorageIdsWatcher;
use super::MigrationStatusWatcher;
use super::NotifyWatcher;
use super::RelationUnitsWatcher;
use super::RemoteApplicationWatcher;
use super::RemoteRelationsWatcher;
use super::StringsWatcher;
use super::WatcherCommon;
use crate::params::NextResult;
use crate::Result;

/// Any constructed watcher facade
#[derive(Debug, Clone)]
pub enum Facade {
    All(AllWatcher),
    Notify(NotifyWatcher),
    Strings(StringsWatcher),
    RelationUnits(RelationUnitsWatcher),
    RemoteApplication(RemoteApplicationWatcher),
    RemoteRelations(RemoteRelationsWatcher),
    MachineStorageIds(MachineStorageIdsWatcher),
    Entities(EntitiesWatcher),
    MigrationStatus(MigrationStatusWatcher),
}

impl Facade {
    /// Waits for the next change of the bound resource.
    pub async fn next(&self) -> Result<NextResult> {
        let result = match self {
            Facade::All(w) => NextResult::AllDeltas(w.next().await?),
            Facade::Notify(w) => {
                w.next().await?;
                NextResult::Notify
            }
            Facade::Strings(w) => NextResult::Strings(w.next().await?),
            Facade::RelationUnits(w) => NextResult::RelationUnits(w.next().await?),
            Facade::RemoteApplication(w) => NextResult::RemoteApplication(w.next().await?),
            Facade::RemoteRelations(w) => NextResult::RemoteRelations(w.next().await?),
            Facade::MachineStorageIds(w) => NextResult::MachineStorageIds(w.next().await?),
            Facade::Entities(w) => NextResult::Entities(w.next().await?),
            Facade::MigrationStatus(w) => NextResult::MigrationStatus(w.next().await?),
        };
        Ok(result)
    }

    pub fn stop(&self) -> Result<()> {
        self.common().stop()
    }

    pub fn id(&self) -> &str {
        self.common().id()
    }

    fn common(&self) -> &WatcherCommon {
        match self {
            Facade::All(w) => w.common(),
            Facade::Notify(w) => w.common(),
            Facade::Strings(w) => w.common(),
            Facade::RelationUnits(w) => w.common(),
            Facade::RemoteApplication(w) => w.common(),
            Facade::RemoteRelations(w) => w.common(),
            Facade::MachineStorageIds(w) => w.common(),
            Facade::Entities(w) => w.common(),
            Facade::MigrationStatus(w) => w.common(),
        }
    }
}

macro_rules! impl_from_watcher {
    ($($watcher:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$watcher> for Facade {
                fn from(w: $watcher) -> Self {
                    Facade::$variant(w)
                }
            }
        )*
    };
}

impl_from_watcher! {
    AllWatcher => All,
    NotifyWatcher => Notify,
    StringsWatcher => Strings,
    RelationUnitsWatcher => RelationUnits,
    RemoteApplicationWatcher => RemoteApplication,
    RemoteRelationsWatcher => RemoteRelations,
    MachineStorageIdsWatcher => MachineStorageIds,
    EntitiesWatcher => Entities,
    MigrationStatusWatcher => MigrationStatus,
}
