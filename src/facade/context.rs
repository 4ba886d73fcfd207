use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthRequirement;
use crate::auth::Authorizer;
use crate::resources::Resource;
use crate::resources::Resources;
use crate::Result;
use crate::WatcherError;

/// Callback run when a facade instance goes away
pub type DisposeFn = Arc<dyn Fn() + Send + Sync>;

/// Everything a facade constructor may see of the calling connection
#[derive(Clone)]
pub struct Context {
    id: String,
    auth: Arc<dyn Authorizer>,
    resources: Arc<Resources>,
    dispose: DisposeFn,
}

impl Context {
    pub fn new(
        id: impl Into<String>,
        auth: Arc<dyn Authorizer>,
        resources: Arc<Resources>,
    ) -> Self {
        Self {
            id: id.into(),
            auth,
            resources,
            dispose: Arc::new(|| {}),
        }
    }

    pub fn with_dispose(
        mut self,
        dispose: DisposeFn,
    ) -> Self {
        self.dispose = dispose;
        self
    }

    /// Id of the resource the facade is bound to
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn auth(&self) -> &Arc<dyn Authorizer> {
        &self.auth
    }

    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    pub fn dispose(&self) {
        (self.dispose)()
    }

    /// Applies the authorization gate, then looks up the resource and picks
    /// the variant the facade expects.
    ///
    /// The registry is not consulted at all when authorization fails. A
    /// missing id and a resource of another kind both yield `UnknownWatcher`.
    pub(crate) fn resolve<T>(
        &self,
        requirement: AuthRequirement,
        facade: &'static str,
        pick: impl FnOnce(&Resource) -> Option<T>,
    ) -> Result<T> {
        requirement.check(self.auth.as_ref())?;

        let resource = self.resources.get(&self.id).ok_or(WatcherError::UnknownWatcher)?;
        let picked = pick(&resource).ok_or(WatcherError::UnknownWatcher)?;
        debug!(watcher_id = %self.id, facade, kind = resource.kind(), "facade bound to resource");
        Ok(picked)
    }
}

impl fmt::Debug for Context {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Context").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Identity and shutdown shared by every facade
#[derive(Clone)]
pub struct WatcherCommon {
    id: String,
    resources: Arc<Resources>,
    dispose: DisposeFn,
}

impl WatcherCommon {
    pub fn new(context: &Context) -> Self {
        Self {
            id: context.id.clone(),
            resources: context.resources.clone(),
            dispose: context.dispose.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Runs the dispose callback, then stops the resource in the registry.
    ///
    /// Stopping wakes a `Next` call blocked on the same resource.
    pub fn stop(&self) -> Result<()> {
        (self.dispose)();
        self.resources.stop(&self.id)
    }
}

impl fmt::Debug for WatcherCommon {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatcherCommon").field("id", &self.id).finish_non_exhaustive()
    }
}
