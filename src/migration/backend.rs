use std::fmt;
use std::net::Ipv6Addr;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tonic::async_trait;

use super::MigrationPhase;
use crate::Result;

/// One reachable API endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostPort {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Flattens host-port sections into `host:port` strings, keeping section order.
pub fn flatten_host_ports(sections: &[Vec<HostPort>]) -> Vec<String> {
    sections
        .iter()
        .flat_map(|section| section.iter().map(HostPort::to_string))
        .collect()
}

/// Controller settings relevant to migrations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub controller_uuid: String,
    pub api_port: u16,
    pub ca_cert: Option<String>,
}

impl ControllerConfig {
    /// The controller's CA certificate, if one is configured.
    pub fn ca_cert(&self) -> Option<&str> {
        self.ca_cert.as_deref().filter(|cert| !cert.is_empty())
    }
}

/// Connection details of the controller a model is migrating to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub controller_tag: String,
    pub addrs: Vec<String>,
    pub ca_cert: String,
    pub auth_tag: String,
}

/// One recorded migration attempt of a model
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModelMigration: Send + Sync {
    fn id(&self) -> String;

    /// Attempt counter, incremented each time the model's migration is retried
    fn attempt(&self) -> u32;

    async fn phase(&self) -> Result<MigrationPhase>;

    async fn target_info(&self) -> Result<TargetInfo>;
}

/// Model store queries needed by the migration-status watcher
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MigrationBackend: Send + Sync {
    /// Most recent migration of the model. Fails with a not-found error when
    /// the model has never been migrated.
    async fn latest_migration(&self) -> Result<Box<dyn ModelMigration>>;

    /// API addresses of the local controller, one section per controller machine
    async fn api_host_ports(&self) -> Result<Vec<Vec<HostPort>>>;

    async fn controller_config(&self) -> Result<ControllerConfig>;
}
