//! Per-connection registry of live watcher resources
//!
//! A `Watch` call elsewhere in the API server registers a [`Resource`] and hands
//! the returned id to the client. Facades look resources up by id, check the
//! variant they expect, and stop them through [`Resources::stop`].

mod registry;
mod resource;


pub use registry::*;
pub use resource::*;
