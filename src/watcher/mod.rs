//! Change channels between backend producers and watcher facades
//!
//! A producer owns a [`ChangeSender`]; the per-connection registry owns the
//! matching [`ChangeSource`]. A facade's `Next` call blocks on
//! [`ChangeSource::next`] until either a change arrives or the source reaches
//! a terminal state.
//!
//! ```text
//! backend producer ──send()──▶ mpsc (bounded) ──next()──▶ facade Next
//!        ▲                                                  │
//!        └──── stopped() ◀── CancellationToken ◀── stop() ──┘ (registry Stop)
//! ```
//!
//! # Termination
//!
//! Every source carries an explicit [`SourceStatus`] that leaves `Active`
//! exactly once:
//!
//! - `Failed(err)`: the producer called [`ChangeSender::fail`]
//! - `Stopped`: the producer closed the channel, or the registry stopped the
//!   resource
//!
//! Because the status is written before the channel is observed closed, a
//! `Next` call that sees the closure always reads the final status, so the
//! stored error is reported deterministically.

mod channel;


pub use channel::*;
