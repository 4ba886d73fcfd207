use std::fmt;
use std::str::FromStr;

use crate::BackendError;
use crate::Error;

/// Phases of a model migration
///
/// ```text
///  QUIESCE -> IMPORT -> VALIDATION -> SUCCESS -> LOGTRANSFER -> REAP -> DONE
///     |         |           |                                    |
///     +---------+-----------+--> ABORT -> ABORTDONE              +--> REAPFAILED
/// ```
///
/// `NONE` is reported when the model has no migration at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MigrationPhase {
    #[default]
    Unknown,
    None,
    Quiesce,
    Import,
    Validation,
    Success,
    LogTransfer,
    Reap,
    ReapFailed,
    Done,
    Abort,
    AbortDone,
}

const ALL_PHASES: [MigrationPhase; 12] = [
    MigrationPhase::Unknown,
    MigrationPhase::None,
    MigrationPhase::Quiesce,
    MigrationPhase::Import,
    MigrationPhase::Validation,
    MigrationPhase::Success,
    MigrationPhase::LogTransfer,
    MigrationPhase::Reap,
    MigrationPhase::ReapFailed,
    MigrationPhase::Done,
    MigrationPhase::Abort,
    MigrationPhase::AbortDone,
];

impl MigrationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationPhase::Unknown => "UNKNOWN",
            MigrationPhase::None => "NONE",
            MigrationPhase::Quiesce => "QUIESCE",
            MigrationPhase::Import => "IMPORT",
            MigrationPhase::Validation => "VALIDATION",
            MigrationPhase::Success => "SUCCESS",
            MigrationPhase::LogTransfer => "LOGTRANSFER",
            MigrationPhase::Reap => "REAP",
            MigrationPhase::ReapFailed => "REAPFAILED",
            MigrationPhase::Done => "DONE",
            MigrationPhase::Abort => "ABORT",
            MigrationPhase::AbortDone => "ABORTDONE",
        }
    }

    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MigrationPhase::Done | MigrationPhase::ReapFailed | MigrationPhase::AbortDone
        )
    }

    /// The model is being moved and must stay quiet.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            MigrationPhase::Quiesce
                | MigrationPhase::Import
                | MigrationPhase::Validation
                | MigrationPhase::Success
        )
    }

    pub fn can_transition_to(
        &self,
        next: MigrationPhase,
    ) -> bool {
        self.valid_transitions().contains(&next)
    }

    fn valid_transitions(&self) -> &'static [MigrationPhase] {
        use MigrationPhase::*;
        match self {
            Quiesce => &[Import, Abort],
            Import => &[Validation, Abort],
            Validation => &[Success, Abort],
            Success => &[LogTransfer],
            LogTransfer => &[Reap],
            Reap => &[Done, ReapFailed],
            Abort => &[AbortDone],
            Unknown | None | ReapFailed | Done | AbortDone => &[],
        }
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PHASES
            .iter()
            .find(|phase| phase.as_str() == s)
            .copied()
            .ok_or_else(|| BackendError::Other(format!("unknown migration phase {:?}", s)).into())
    }
}
