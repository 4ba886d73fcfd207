//! Authorization gate applied once, at facade construction.
//!
//! Each watcher facade evaluates exactly one [`AuthRequirement`] before it
//! looks at the resource registry. A rejected caller learns nothing about
//! whether the requested watcher id exists.

#[cfg(test)]
mod auth_test;

#[cfg(test)]
use mockall::automock;
use tracing::warn;

use crate::names::Tag;
use crate::names::TagKind;
use crate::Result;
use crate::WatcherError;

/// Identity predicates of the connected caller
#[cfg_attr(test, automock)]
pub trait Authorizer: Send + Sync {
    /// Any authenticated client (a user, not an agent)
    fn auth_client(&self) -> bool;

    /// The controller itself, or an agent with controller rights
    fn auth_controller(&self) -> bool;

    /// An agent running on a managed machine
    fn auth_machine_agent(&self) -> bool;

    /// An agent running inside a deployed unit
    fn auth_unit_agent(&self) -> bool;

    /// Tag of the authenticated entity
    fn auth_tag(&self) -> Tag;
}

/// The predicate a facade requires of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Client,
    /// Machine agent or unit agent
    Agent,
    Controller,
}

impl AuthRequirement {
    pub fn is_satisfied_by(
        &self,
        auth: &dyn Authorizer,
    ) -> bool {
        match self {
            AuthRequirement::Client => auth.auth_client(),
            AuthRequirement::Agent => is_agent(auth),
            AuthRequirement::Controller => auth.auth_controller(),
        }
    }

    /// Fails with `PermissionDenied` when the caller does not qualify.
    pub fn check(
        &self,
        auth: &dyn Authorizer,
    ) -> Result<()> {
        if self.is_satisfied_by(auth) {
            return Ok(());
        }
        warn!(requirement = ?self, tag = %auth.auth_tag(), "authorization rejected");
        Err(WatcherError::PermissionDenied.into())
    }
}

pub fn is_agent(auth: &dyn Authorizer) -> bool {
    auth.auth_machine_agent() || auth.auth_unit_agent()
}

/// Authorizer derived from the tag the connection logged in with.
///
/// Machine tags are machine agents, unit tags are unit agents and user tags
/// are clients. Controller access is granted separately.
#[derive(Debug, Clone)]
pub struct EntityAuthorizer {
    tag: Tag,
    controller: bool,
}

impl EntityAuthorizer {
    pub fn new(tag: Tag) -> Self {
        Self { tag, controller: false }
    }

    pub fn with_controller(
        mut self,
        controller: bool,
    ) -> Self {
        self.controller = controller;
        self
    }
}

impl Authorizer for EntityAuthorizer {
    fn auth_client(&self) -> bool {
        self.tag.kind() == TagKind::User
    }

    fn auth_controller(&self) -> bool {
        self.controller
    }

    fn auth_machine_agent(&self) -> bool {
        self.tag.kind() == TagKind::Machine
    }

    fn auth_unit_agent(&self) -> bool {
        self.tag.kind() == TagKind::Unit
    }

    fn auth_tag(&self) -> Tag {
        self.tag.clone()
    }
}
