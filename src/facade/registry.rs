use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::AllWatcher;
use super::Context;
use super::EntitiesWatcher;
use super::Facade;
use super::MachineStorageIdsWatcher;
use super::MigrationStatusWatcher;
use super::NotifyWatcher;
use super::RelationUnitsWatcher;
use super::RemoteApplicationWatcher;
use super::RemoteRelationsWatcher;
use super::StringsWatcher;
use crate::migration::MigrationBackend;
use crate::FacadeError;
use crate::Result;

/// Builds a facade bound to the context's resource
pub type FacadeFactory = Arc<dyn Fn(&Context) -> Result<Facade> + Send + Sync>;

/// Named, versioned facade constructors
///
/// Built once at startup and handed to every connection's session.
#[derive(Clone, Default)]
pub struct FacadeRegistry {
    factories: BTreeMap<(String, u32), FacadeFactory>,
}

impl FacadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The watcher facades served by an API server, with migration queries
    /// answered by `backend`.
    pub fn standard(backend: Arc<dyn MigrationBackend>) -> Self {
        let mut registry = Self::new();
        registry.insert("AllWatcher", 1, |ctx| AllWatcher::new(ctx).map(Facade::from));
        // Same implementation; the Watch call that created the resource decides its scope.
        registry.insert("AllModelWatcher", 2, |ctx| AllWatcher::new(ctx).map(Facade::from));
        registry.insert("NotifyWatcher", 1, |ctx| NotifyWatcher::new(ctx).map(Facade::from));
        registry.insert("StringsWatcher", 1, |ctx| StringsWatcher::new(ctx).map(Facade::from));
        registry.insert("RemoteApplicationWatcher", 1, |ctx| {
            RemoteApplicationWatcher::new(ctx).map(Facade::from)
        });
        registry.insert("RemoteRelationsWatcher", 1, |ctx| {
            RemoteRelationsWatcher::new(ctx).map(Facade::from)
        });
        registry.insert("RelationUnitsWatcher", 1, |ctx| {
            RelationUnitsWatcher::new(ctx).map(Facade::from)
        });
        registry.insert("VolumeAttachmentsWatcher", 2, |ctx| {
            MachineStorageIdsWatcher::volume_attachments(ctx).map(Facade::from)
        });
        registry.insert("FilesystemAttachmentsWatcher", 2, |ctx| {
            MachineStorageIdsWatcher::filesystem_attachments(ctx).map(Facade::from)
        });
        registry.insert("EntityWatcher", 2, |ctx| EntitiesWatcher::new(ctx).map(Facade::from));
        registry.insert("MigrationStatusWatcher", 1, move |ctx| {
            MigrationStatusWatcher::new(ctx, backend.clone()).map(Facade::from)
        });
        registry
    }

    /// Adds a facade. Each `(name, version)` pair may be registered once.
    pub fn register<F>(
        &mut self,
        name: &str,
        version: u32,
        factory: F,
    ) -> Result<()>
    where
        F: Fn(&Context) -> Result<Facade> + Send + Sync + 'static,
    {
        if self.factories.contains_key(&(name.to_string(), version)) {
            return Err(FacadeError::AlreadyRegistered {
                name: name.to_string(),
                version,
            }
            .into());
        }
        self.insert(name, version, factory);
        Ok(())
    }

    fn insert<F>(
        &mut self,
        name: &str,
        version: u32,
        factory: F,
    ) where
        F: Fn(&Context) -> Result<Facade> + Send + Sync + 'static,
    {
        debug!(facade = name, version, "facade registered");
        self.factories.insert((name.to_string(), version), Arc::new(factory));
    }

    pub fn lookup(
        &self,
        name: &str,
        version: u32,
    ) -> Result<FacadeFactory> {
        self.factories
            .get(&(name.to_string(), version))
            .cloned()
            .ok_or_else(|| {
                FacadeError::UnknownFacade {
                    name: name.to_string(),
                    version,
                }
                .into()
            })
    }

    /// Looks up `(name, version)` and binds a new facade to `context`.
    pub fn construct(
        &self,
        name: &str,
        version: u32,
        context: &Context,
    ) -> Result<Facade> {
        let factory = self.lookup(name, version)?;
        factory(context)
    }

    /// Registered `(name, version)` pairs, sorted.
    pub fn facades(&self) -> Vec<(String, u32)> {
        self.factories.keys().cloned().collect()
    }
}

impl fmt::Debug for FacadeRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("FacadeRegistry")
            .field("facades", &self.facades())
            .finish()
    }
}
