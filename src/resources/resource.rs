use std::fmt;
use std::sync::Arc;

use crate::names::MapChangesFn;
use crate::params::Delta;
use crate::params::RelationUnitsChange;
use crate::params::RemoteApplicationChange;
use crate::params::RemoteRelationsChange;
use crate::watcher::ChangeSource;
use crate::watcher::NotifySource;
use crate::watcher::StringsSource;

pub type RelationUnitsSource = ChangeSource<RelationUnitsChange>;
pub type RemoteApplicationSource = ChangeSource<RemoteApplicationChange>;
pub type RemoteRelationsSource = ChangeSource<RemoteRelationsChange>;
pub type AllDeltasSource = ChangeSource<Vec<Delta>>;

/// A strings source whose raw ids are converted to tags on delivery
#[derive(Clone)]
pub struct EntitiesSource {
    pub source: Arc<StringsSource>,
    pub map_changes: MapChangesFn,
}

impl EntitiesSource {
    pub fn new(
        source: Arc<StringsSource>,
        map_changes: MapChangesFn,
    ) -> Self {
        Self { source, map_changes }
    }
}

/// Resource kinds a registry can hold, one per change shape
#[derive(Clone)]
pub enum Resource {
    Notify(Arc<NotifySource>),
    Strings(Arc<StringsSource>),
    RelationUnits(Arc<RelationUnitsSource>),
    RemoteApplication(Arc<RemoteApplicationSource>),
    RemoteRelations(Arc<RemoteRelationsSource>),
    Entities(EntitiesSource),
    AllDeltas(Arc<AllDeltasSource>),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Notify(_) => "notify",
            Resource::Strings(_) => "strings",
            Resource::RelationUnits(_) => "relation-units",
            Resource::RemoteApplication(_) => "remote-application",
            Resource::RemoteRelations(_) => "remote-relations",
            Resource::Entities(_) => "entities",
            Resource::AllDeltas(_) => "all-deltas",
        }
    }

    /// Stops the underlying source, waking any blocked `Next`.
    pub fn stop(&self) {
        match self {
            Resource::Notify(source) => source.stop(),
            Resource::Strings(source) => source.stop(),
            Resource::RelationUnits(source) => source.stop(),
            Resource::RemoteApplication(source) => source.stop(),
            Resource::RemoteRelations(source) => source.stop(),
            Resource::Entities(entities) => entities.source.stop(),
            Resource::AllDeltas(source) => source.stop(),
        }
    }

    pub fn as_notify(&self) -> Option<Arc<NotifySource>> {
        match self {
            Resource::Notify(source) => Some(source.clone()),
            _ => None,
        }
    }

    /// An entities source is also a strings source; its raw ids are exposed.
    pub fn as_strings(&self) -> Option<Arc<StringsSource>> {
        match self {
            Resource::Strings(source) => Some(source.clone()),
            Resource::Entities(entities) => Some(entities.source.clone()),
            _ => None,
        }
    }

    pub fn as_relation_units(&self) -> Option<Arc<RelationUnitsSource>> {
        match self {
            Resource::RelationUnits(source) => Some(source.clone()),
            _ => None,
        }
    }

    pub fn as_remote_application(&self) -> Option<Arc<RemoteApplicationSource>> {
        match self {
            Resource::RemoteApplication(source) => Some(source.clone()),
            _ => None,
        }
    }

    pub fn as_remote_relations(&self) -> Option<Arc<RemoteRelationsSource>> {
        match self {
            Resource::RemoteRelations(source) => Some(source.clone()),
            _ => None,
        }
    }

    pub fn as_entities(&self) -> Option<EntitiesSource> {
        match self {
            Resource::Entities(entities) => Some(entities.clone()),
            _ => None,
        }
    }

    pub fn as_all_deltas(&self) -> Option<Arc<AllDeltasSource>> {
        match self {
            Resource::AllDeltas(source) => Some(source.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.kind()).finish()
    }
}

impl From<NotifySource> for Resource {
    fn from(source: NotifySource) -> Self {
        Resource::Notify(Arc::new(source))
    }
}

impl From<StringsSource> for Resource {
    fn from(source: StringsSource) -> Self {
        Resource::Strings(Arc::new(source))
    }
}

impl From<RelationUnitsSource> for Resource {
    fn from(source: RelationUnitsSource) -> Self {
        Resource::RelationUnits(Arc::new(source))
    }
}

impl From<RemoteApplicationSource> for Resource {
    fn from(source: RemoteApplicationSource) -> Self {
        Resource::RemoteApplication(Arc::new(source))
    }
}

impl From<RemoteRelationsSource> for Resource {
    fn from(source: RemoteRelationsSource) -> Self {
        Resource::RemoteRelations(Arc::new(source))
    }
}

impl From<EntitiesSource> for Resource {
    fn from(entities: EntitiesSource) -> Self {
        Resource::Entities(entities)
    }
}

impl From<AllDeltasSource> for Resource {
    fn from(source: AllDeltasSource) -> Self {
        Resource::AllDeltas(Arc::new(source))
    }
}
