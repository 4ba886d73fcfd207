use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tracing::debug;
use tracing::trace;

use super::Resource;
use crate::metrics::LIVE_RESOURCES;
use crate::RegistryConfig;
use crate::Result;
use crate::WatcherError;

/// Live resources of one client connection, keyed by id
///
/// All methods are safe to call concurrently; the map uses per-shard locks and
/// no lock is held while a resource is being stopped.
#[derive(Debug)]
pub struct Resources {
    resources: DashMap<String, Resource>,

    /// Next resource id (monotonically increasing, never reused)
    next_id: AtomicU64,

    /// Slots taken by registered resources, reserved before insertion
    reserved: AtomicUsize,

    /// 0 means unlimited
    max_resources: usize,
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

impl Resources {
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig { max_resources: 0 })
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            resources: DashMap::new(),
            next_id: AtomicU64::new(1),
            reserved: AtomicUsize::new(0),
            max_resources: config.max_resources,
        }
    }

    /// Stores `resource` and returns its newly allocated id.
    pub fn register(
        &self,
        resource: impl Into<Resource>,
    ) -> Result<String> {
        self.reserve_slot()?;

        let resource = resource.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        trace!(resource_id = %id, kind = resource.kind(), "resource registered");

        self.resources.insert(id.clone(), resource);
        LIVE_RESOURCES.inc();
        Ok(id)
    }

    /// The resource registered under `id`, if any.
    pub fn get(
        &self,
        id: &str,
    ) -> Option<Resource> {
        self.resources.get(id).map(|entry| entry.value().clone())
    }

    /// Removes and stops the resource. Stopping an unknown id is a no-op.
    pub fn stop(
        &self,
        id: &str,
    ) -> Result<()> {
        if let Some((_, resource)) = self.resources.remove(id) {
            self.release_slot();
            LIVE_RESOURCES.dec();
            resource.stop();
            debug!(resource_id = %id, kind = resource.kind(), "resource stopped");
        }
        Ok(())
    }

    /// Stops every resource; used when the connection goes away.
    pub fn stop_all(&self) -> usize {
        let ids: Vec<String> = self.resources.iter().map(|entry| entry.key().clone()).collect();
        let mut stopped = 0;
        for id in ids {
            if let Some((_, resource)) = self.resources.remove(&id) {
                self.release_slot();
                LIVE_RESOURCES.dec();
                resource.stop();
                stopped += 1;
            }
        }
        stopped
    }

    pub fn count(&self) -> usize {
        self.resources.len()
    }

    fn reserve_slot(&self) -> Result<()> {
        let max = self.max_resources;
        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |taken| {
                (max == 0 || taken < max).then_some(taken + 1)
            })
            .map(|_| ())
            .map_err(|_| WatcherError::TooManyResources { limit: max }.into())
    }

    fn release_slot(&self) {
        self.reserved.fetch_sub(1, Ordering::AcqRel);
    }
}
