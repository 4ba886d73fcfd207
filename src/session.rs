//! Per-connection facade session
//!
//! A session owns the connection's resource registry and builds facades on
//! demand from the shared [`FacadeRegistry`]. A facade is constructed on the
//! first call naming its `(name, version, id)`; construction failures are
//! that call's result. Built facades are cached until a `Stop` on their
//! resource runs.

use std::fmt;
use std::sync::Arc;
use std::sync::Weak;

use dashmap::DashMap;
use tracing::debug;
use tracing::info;

use crate::auth::Authorizer;
use crate::facade::Context;
use crate::facade::Facade;
use crate::facade::FacadeRegistry;
use crate::metrics;
use crate::params::NextResult;
use crate::resources::Resources;
use crate::FacadeConfig;
use crate::Result;

type FacadeKey = (String, u32, String);

/// Metric label for calls naming a facade that is not registered
const UNREGISTERED_FACADE: &str = "unregistered";

pub struct Session {
    auth: Arc<dyn Authorizer>,
    resources: Arc<Resources>,
    registry: Arc<FacadeRegistry>,
    facades: Arc<DashMap<FacadeKey, Facade>>,
}

impl Session {
    pub fn new(
        auth: Arc<dyn Authorizer>,
        registry: Arc<FacadeRegistry>,
        config: &FacadeConfig,
    ) -> Self {
        Self {
            auth,
            resources: Arc::new(Resources::with_config(&config.registry)),
            registry,
            facades: Arc::new(DashMap::new()),
        }
    }

    /// Registry of this connection's resources, where `Watch` calls store
    /// the sources they create.
    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    /// Serves `Next` on facade `name`/`version` bound to resource `id`.
    pub async fn next(
        &self,
        name: &str,
        version: u32,
        id: &str,
    ) -> Result<NextResult> {
        let result = match self.facade(name, version, id) {
            Ok(facade) => facade.next().await,
            Err(e) => Err(e),
        };
        let label = if self.registry.lookup(name, version).is_ok() {
            name
        } else {
            UNREGISTERED_FACADE
        };
        metrics::record_next(label, result.as_ref().err().map(|e| e.kind()));
        result
    }

    /// Runs `Stop` on the facade bound to `id`, building it first if needed.
    pub fn stop(
        &self,
        name: &str,
        version: u32,
        id: &str,
    ) -> Result<()> {
        self.facade(name, version, id)?.stop()
    }

    /// Stops every resource of the connection.
    pub fn close(&self) -> usize {
        self.facades.clear();
        let stopped = self.resources.stop_all();
        info!(stopped, tag = %self.auth.auth_tag(), "session closed");
        stopped
    }

    /// Number of facades currently built
    pub fn facade_count(&self) -> usize {
        self.facades.len()
    }

    fn facade(
        &self,
        name: &str,
        version: u32,
        id: &str,
    ) -> Result<Facade> {
        let key = (name.to_string(), version, id.to_string());
        let cached = self.facades.get(&key).map(|entry| entry.value().clone());
        if let Some(facade) = cached {
            if self.resources.get(id).is_some() {
                return Ok(facade);
            }
            // Stopped behind this facade's back; rebuilding reports the missing id.
            evict_resource(&self.facades, id);
        }

        let context = Context::new(id, self.auth.clone(), self.resources.clone())
            .with_dispose(Self::evict_on_dispose(Arc::downgrade(&self.facades), id.to_string()));
        let facade = self.registry.construct(name, version, &context)?;
        debug!(facade = name, version, watcher_id = %id, "facade constructed");

        Ok(self.facades.entry(key).or_insert(facade).value().clone())
    }

    /// Disposing any facade evicts every facade bound to the same resource.
    fn evict_on_dispose(
        facades: Weak<DashMap<FacadeKey, Facade>>,
        id: String,
    ) -> Arc<dyn Fn() + Send + Sync> {
        Arc::new(move || {
            if let Some(facades) = facades.upgrade() {
                evict_resource(&facades, &id);
            }
        })
    }
}

fn evict_resource(
    facades: &DashMap<FacadeKey, Facade>,
    id: &str,
) {
    facades.retain(|(_, _, bound), _| bound != id);
}

impl fmt::Debug for Session {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Session")
            .field("resources", &self.resources.count())
            .field("facades", &self.facades.len())
            .finish()
    }
}
