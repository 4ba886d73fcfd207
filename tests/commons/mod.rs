use std::sync::Arc;

use tonic::async_trait;
use watch_facade::auth::Authorizer;
use watch_facade::auth::EntityAuthorizer;
use watch_facade::facade::FacadeRegistry;
use watch_facade::migration::ControllerConfig;
use watch_facade::migration::HostPort;
use watch_facade::migration::MigrationBackend;
use watch_facade::migration::MigrationPhase;
use watch_facade::migration::ModelMigration;
use watch_facade::migration::TargetInfo;
use watch_facade::names::Tag;
use watch_facade::session::Session;
use watch_facade::BackendError;
use watch_facade::FacadeConfig;
use watch_facade::Result;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

pub fn unit_agent(name: &str) -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::unit(name).unwrap()))
}

pub fn user(name: &str) -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::user(name).unwrap()))
}

/// Migration record held in memory
#[derive(Clone)]
pub struct FakeMigration {
    pub id: String,
    pub attempt: u32,
    pub phase: MigrationPhase,
    pub target: TargetInfo,
}

#[async_trait]
impl ModelMigration for FakeMigration {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn attempt(&self) -> u32 {
        self.attempt
    }

    async fn phase(&self) -> Result<MigrationPhase> {
        Ok(self.phase)
    }

    async fn target_info(&self) -> Result<TargetInfo> {
        Ok(self.target.clone())
    }
}

/// Model store stand-in answering migration queries from fixed data
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub migration: Option<FakeMigration>,
    pub host_ports: Vec<Vec<HostPort>>,
    pub controller: ControllerConfig,
}

#[async_trait]
impl MigrationBackend for FakeBackend {
    async fn latest_migration(&self) -> Result<Box<dyn ModelMigration>> {
        match &self.migration {
            Some(migration) => Ok(Box::new(migration.clone())),
            None => Err(BackendError::NotFound("migration".to_string()).into()),
        }
    }

    async fn api_host_ports(&self) -> Result<Vec<Vec<HostPort>>> {
        Ok(self.host_ports.clone())
    }

    async fn controller_config(&self) -> Result<ControllerConfig> {
        Ok(self.controller.clone())
    }
}

pub fn session(
    auth: Arc<dyn Authorizer>,
    backend: FakeBackend,
) -> Session {
    enable_logger();
    let registry = Arc::new(FacadeRegistry::standard(Arc::new(backend)));
    Session::new(auth, registry, &FacadeConfig::default())
}
