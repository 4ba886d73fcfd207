use std::sync::Arc;

use crate::auth::Authorizer;
use crate::auth::EntityAuthorizer;
use crate::names::Tag;

// This will ensure the subscriber is only installed once.
static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Stand-in for a backend failure recorded by a change producer
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BackendFailure(pub String);

pub fn unit_agent() -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::unit("mysql/0").unwrap()))
}

pub fn machine_agent() -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::machine("0").unwrap()))
}

pub fn client() -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::user("admin").unwrap()))
}

pub fn controller() -> Arc<dyn Authorizer> {
    Arc::new(EntityAuthorizer::new(Tag::machine("0").unwrap()).with_controller(true))
}
