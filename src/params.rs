//! Wire-shaped results returned by the watcher facades.
//!
//! Field names serialize in kebab-case, the convention of the API wire format.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of a model entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Life {
    #[default]
    Alive,
    Dying,
    Dead,
}

impl fmt::Display for Life {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Life::Alive => "alive",
            Life::Dying => "dying",
            Life::Dead => "dead",
        };
        f.write_str(s)
    }
}

//------------------------------------------------------
// Strings / entities

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StringsWatchResult {
    pub changes: Vec<String>,
}

/// Same shape as [`StringsWatchResult`], but the changes are entity tags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntitiesWatchResult {
    pub changes: Vec<String>,
}

//------------------------------------------------------
// Relation units

/// Settings version of a unit in relation scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitSettings {
    pub version: i64,
}

/// Units entering, changing settings in, or leaving one relation's scope
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelationUnitsChange {
    /// Unit name to the settings version it now has
    pub changed: BTreeMap<String, UnitSettings>,
    pub departed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelationUnitsWatchResult {
    pub changes: RelationUnitsChange,
}

//------------------------------------------------------
// Remote applications and relations

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteRelationUnitChange {
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteRelationChange {
    pub relation_id: i64,
    pub life: Life,
    pub changed_units: BTreeMap<String, RemoteRelationUnitChange>,
    pub departed_units: Vec<String>,
}

/// Current state of the relations to one remote application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteRelationsChange {
    pub changed: Vec<RemoteRelationChange>,
    pub removed: Vec<i64>,
    /// Set on the first change a watcher reports
    pub initial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteApplicationChange {
    pub application_tag: String,
    pub life: Life,
    pub relations: RemoteRelationsChange,
}

/// A single snapshot rather than a list: one entity is watched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteApplicationWatchResult {
    pub change: Option<RemoteApplicationChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteRelationsWatchResult {
    pub change: Option<RemoteRelationsChange>,
}

//------------------------------------------------------
// Machine storage attachments

/// A storage entity attached to a machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MachineStorageId {
    pub machine_tag: String,
    /// Volume or filesystem tag
    pub attachment_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MachineStorageIdsWatchResult {
    pub changes: Vec<MachineStorageId>,
}

//------------------------------------------------------
// Model-wide deltas

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MachineInfo {
    pub model_uuid: String,
    pub id: String,
    pub life: Life,
    pub instance_id: String,
    pub series: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationInfo {
    pub model_uuid: String,
    pub name: String,
    pub life: Life,
    pub charm_url: String,
    pub exposed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitInfo {
    pub model_uuid: String,
    pub name: String,
    pub application: String,
    pub machine_id: String,
    pub life: Life,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelationInfo {
    pub model_uuid: String,
    pub key: String,
    pub id: i64,
}

/// Any entity the model-wide aggregator reports on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "lowercase")]
pub enum EntityInfo {
    Machine(MachineInfo),
    Application(ApplicationInfo),
    Unit(UnitInfo),
    Relation(RelationInfo),
}

impl EntityInfo {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityInfo::Machine(_) => "machine",
            EntityInfo::Application(_) => "application",
            EntityInfo::Unit(_) => "unit",
            EntityInfo::Relation(_) => "relation",
        }
    }

    pub fn model_uuid(&self) -> &str {
        match self {
            EntityInfo::Machine(info) => &info.model_uuid,
            EntityInfo::Application(info) => &info.model_uuid,
            EntityInfo::Unit(info) => &info.model_uuid,
            EntityInfo::Relation(info) => &info.model_uuid,
        }
    }
}

/// One change to one entity: updated (or created), or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Delta {
    pub removed: bool,
    pub entity: EntityInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AllWatcherNextResults {
    pub deltas: Vec<Delta>,
}

//------------------------------------------------------
// Migration

/// Derived status of the model's current migration, rebuilt on every call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MigrationStatus {
    pub migration_id: String,
    pub attempt: u32,
    pub phase: String,
    pub source_api_addrs: Vec<String>,
    pub source_ca_cert: String,
    pub target_api_addrs: Vec<String>,
    pub target_ca_cert: String,
}

//------------------------------------------------------

/// Result of `Next` on any facade, for callers dispatching by facade name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NextResult {
    /// A notify watcher reports only that something changed
    Notify,
    Strings(StringsWatchResult),
    Entities(EntitiesWatchResult),
    RelationUnits(RelationUnitsWatchResult),
    RemoteApplication(RemoteApplicationWatchResult),
    RemoteRelations(RemoteRelationsWatchResult),
    MachineStorageIds(MachineStorageIdsWatchResult),
    AllDeltas(AllWatcherNextResults),
    MigrationStatus(MigrationStatus),
}
