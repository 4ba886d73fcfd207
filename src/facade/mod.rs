//! Watcher facades
//!
//! A facade is a thin view over one registered resource. It is built once per
//! connection and resource id, evaluating a single authorization requirement,
//! and then serves any number of sequential `Next` calls:
//!
//! ```text
//!   backend producer --send--> ChangeSource --next--> shape --> wire result
//!                                   ^
//!   Stop: dispose() then Resources::stop(id) wakes a pending Next
//! ```
//!
//! | Facade                       | Ver | Auth       | Resource                  |
//! |------------------------------|-----|------------|---------------------------|
//! | AllWatcher                   | 1   | client     | all-deltas                |
//! | AllModelWatcher              | 2   | client     | all-deltas                |
//! | NotifyWatcher                | 1   | agent      | notify                    |
//! | StringsWatcher               | 1   | agent      | strings                   |
//! | RemoteApplicationWatcher     | 1   | controller | remote-application        |
//! | RemoteRelationsWatcher       | 1   | controller | remote-relations          |
//! | RelationUnitsWatcher         | 1   | agent      | relation-units            |
//! | VolumeAttachmentsWatcher     | 2   | agent      | strings + volume parser   |
//! | FilesystemAttachmentsWatcher | 2   | agent      | strings + filesystem parser |
//! | EntityWatcher                | 2   | agent      | entities                  |
//! | MigrationStatusWatcher       | 1   | agent      | notify + migration backend |

mod context;
mod dispatch;
mod migration_status;
mod registry;
mod watchers;

#[cfg(test)]
mod migration_status_test;

pub use context::*;
pub use dispatch::*;
pub use migration_status::*;
pub use registry::*;
pub use watchers::*;
