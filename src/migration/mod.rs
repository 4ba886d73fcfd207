//! Model migration data consumed by the migration-status watcher.
//!
//! The backing store is reached only through [`MigrationBackend`] and
//! [`ModelMigration`]; both are implemented outside this crate.

mod backend;
mod phase;


pub use backend::*;
pub use phase::*;
