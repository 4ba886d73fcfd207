//! Watch facades of a cluster orchestrator's API server
//!
//! Connected clients subscribe to incremental model changes by holding a
//! watcher resource and repeatedly calling `Next` on the facade bound to it.
//! This crate holds the per-connection resource registry, the authorization
//! gate applied when a facade is built, the typed watcher facades and the
//! migration-status watcher.

mod config;
mod errors;

pub mod auth;
pub mod facade;
pub mod metrics;
pub mod migration;
pub mod names;
pub mod params;
pub mod resources;
pub mod session;
pub mod storage;
pub mod watcher;

pub use self::config::*;
pub use self::errors::*;


//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
