use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::next_change;
use super::Context;
use super::WatcherCommon;
use crate::auth::AuthRequirement;
use crate::migration::flatten_host_ports;
use crate::migration::MigrationBackend;
use crate::migration::MigrationPhase;
use crate::params::MigrationStatus;
use crate::watcher::NotifySource;
use crate::BackendError;
use crate::Error;
use crate::Result;

/// Reports the model's current migration every time its notify source fires
///
/// Each `Next` rebuilds the whole status from the backend. Any failing query
/// aborts the call with the name of the step that failed; the watcher stays
/// usable for the next call.
#[derive(Clone)]
pub struct MigrationStatusWatcher {
    common: WatcherCommon,
    source: Arc<NotifySource>,
    backend: Arc<dyn MigrationBackend>,
}

impl MigrationStatusWatcher {
    pub fn new(
        context: &Context,
        backend: Arc<dyn MigrationBackend>,
    ) -> Result<Self> {
        let source = context.resolve(AuthRequirement::Agent, "MigrationStatusWatcher", |r| r.as_notify())?;
        Ok(Self {
            common: WatcherCommon::new(context),
            source,
            backend,
        })
    }

    pub async fn next(&self) -> Result<MigrationStatus> {
        next_change(self.common.id(), &self.source, Ok).await?;

        let migration = match self.backend.latest_migration().await {
            Ok(migration) => migration,
            Err(e) if e.is_not_found() => {
                debug!(watcher_id = %self.common.id(), "no migration recorded");
                return Ok(MigrationStatus {
                    phase: MigrationPhase::None.to_string(),
                    ..Default::default()
                });
            }
            Err(e) => return Err(e.annotate("migration lookup")),
        };

        let phase = migration
            .phase()
            .await
            .map_err(|e| e.annotate("retrieving migration phase"))?;

        let source_api_addrs = self
            .backend
            .api_host_ports()
            .await
            .map(|sections| flatten_host_ports(&sections))
            .map_err(|e| e.annotate("retrieving source addresses"))?;

        let source_ca_cert = self
            .controller_ca_cert()
            .await
            .map_err(|e| e.annotate("retrieving source CA cert"))?;

        let target = migration
            .target_info()
            .await
            .map_err(|e| e.annotate("retrieving target info"))?;

        Ok(MigrationStatus {
            migration_id: migration.id(),
            attempt: migration.attempt(),
            phase: phase.to_string(),
            source_api_addrs,
            source_ca_cert,
            target_api_addrs: target.addrs,
            target_ca_cert: target.ca_cert,
        })
    }

    async fn controller_ca_cert(&self) -> Result<String> {
        let config = self.backend.controller_config().await?;
        config
            .ca_cert()
            .map(str::to_string)
            .ok_or_else(|| Error::from(BackendError::Other("missing CA cert for controller model".to_string())))
    }

    pub fn common(&self) -> &WatcherCommon {
        &self.common
    }
}

impl fmt::Debug for MigrationStatusWatcher {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("MigrationStatusWatcher")
            .field("common", &self.common)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
