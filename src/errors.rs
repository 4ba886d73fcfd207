//! Watch Facade Error Hierarchy
//!
//! Defines the error types surfaced by the watcher facades, categorized by the
//! layer that produced them: authorization and registry lookups, facade table
//! lookups, backend queries and entity-name parsing.
//!
//! Terminal conditions (`StoppedWatcher`, or the producer's stored error) are
//! permanent for a resource. Everything else is an operation-local failure
//! that leaves the resource usable for the next call.

use std::sync::Arc;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authorization and watcher-resource conditions
    #[error(transparent)]
    Watcher(#[from] WatcherError),

    /// Facade registration table failures
    #[error(transparent)]
    Facade(#[from] FacadeError),

    /// Failures reported by the backing model store
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Malformed entity ids, names or tags
    #[error(transparent)]
    Names(#[from] NamesError),

    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure recorded by a change producer before it closed its channel.
    /// Surfaced verbatim in place of `StoppedWatcher`.
    #[error(transparent)]
    Stored(Arc<dyn std::error::Error + Send + Sync>),

    /// A failure annotated with the operation step that produced it
    #[error("{context}: {source}")]
    Annotated {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// Authorization predicate rejected the caller at facade construction
    #[error("permission denied")]
    PermissionDenied,

    /// Resource id absent from the registry, or present with another kind
    #[error("unknown watcher id")]
    UnknownWatcher,

    /// Change channel closed without a more specific stored error
    #[error("watcher was stopped")]
    StoppedWatcher,

    /// Registry refused a new resource
    #[error("too many resources registered (limit {limit})")]
    TooManyResources { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("unknown facade {name} version {version}")]
    UnknownFacade { name: String, version: u32 },

    #[error("facade {name} version {version} already registered")]
    AlreadyRegistered { name: String, version: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Requested entity does not exist in the model
    #[error("{0} not found")]
    NotFound(String),

    /// Store cannot serve the request right now
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NamesError {
    #[error("invalid machine id {0:?}")]
    InvalidMachineId(String),

    #[error("invalid unit name {0:?}")]
    InvalidUnitName(String),

    #[error("invalid application name {0:?}")]
    InvalidApplicationName(String),

    #[error("invalid volume id {0:?}")]
    InvalidVolumeId(String),

    #[error("invalid filesystem id {0:?}")]
    InvalidFilesystemId(String),

    #[error("invalid user name {0:?}")]
    InvalidUserName(String),

    #[error("{0:?} is not a valid tag")]
    InvalidTag(String),

    #[error("invalid {kind} attachment ID {id:?}")]
    InvalidAttachmentId { kind: &'static str, id: String },
}

impl Error {
    /// Wraps `self` with the name of the step that failed.
    pub fn annotate(
        self,
        context: impl Into<String>,
    ) -> Self {
        Error::Annotated {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wraps a producer-side failure so it can be stored and surfaced repeatedly.
    pub fn stored<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Stored(Arc::new(err))
    }

    /// Strips annotations down to the originating error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Annotated { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.root_cause(), Error::Watcher(WatcherError::PermissionDenied))
    }

    pub fn is_unknown_watcher(&self) -> bool {
        matches!(self.root_cause(), Error::Watcher(WatcherError::UnknownWatcher))
    }

    pub fn is_stopped_watcher(&self) -> bool {
        matches!(self.root_cause(), Error::Watcher(WatcherError::StoppedWatcher))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Error::Backend(BackendError::NotFound(_)))
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self.root_cause() {
            Error::Watcher(WatcherError::PermissionDenied) => "permission_denied",
            Error::Watcher(WatcherError::UnknownWatcher) => "unknown_watcher",
            Error::Watcher(WatcherError::StoppedWatcher) => "stopped",
            Error::Watcher(WatcherError::TooManyResources { .. }) => "too_many_resources",
            Error::Facade(_) => "facade",
            Error::Backend(BackendError::NotFound(_)) => "not_found",
            Error::Backend(_) => "backend",
            Error::Names(_) => "names",
            Error::Config(_) => "config",
            Error::Stored(_) => "stored",
            Error::Annotated { .. } => "annotated",
        }
    }
}

// ============== RPC boundary ============== //
impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err.root_cause() {
            Error::Watcher(WatcherError::PermissionDenied) => tonic::Status::permission_denied(message),
            Error::Watcher(WatcherError::UnknownWatcher) => tonic::Status::not_found(message),
            Error::Watcher(WatcherError::StoppedWatcher) => tonic::Status::cancelled(message),
            Error::Watcher(WatcherError::TooManyResources { .. }) => {
                tonic::Status::resource_exhausted(message)
            }
            Error::Facade(FacadeError::UnknownFacade { .. }) => tonic::Status::unimplemented(message),
            Error::Backend(BackendError::NotFound(_)) => tonic::Status::not_found(message),
            Error::Backend(BackendError::Unavailable(_)) => tonic::Status::unavailable(message),
            _ => tonic::Status::internal(message),
        }
    }
}
