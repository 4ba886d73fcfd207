use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use crate::Error;
use crate::Result;
use crate::WatcherConfig;
use crate::WatcherError;

/// Terminal-state tracking for one change source
#[derive(Clone)]
pub enum SourceStatus {
    Active,
    Stopped,
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SourceStatus::Active)
    }
}

impl fmt::Debug for SourceStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            SourceStatus::Active => f.write_str("Active"),
            SourceStatus::Stopped => f.write_str("Stopped"),
            SourceStatus::Failed(err) => write!(f, "Failed({})", err),
        }
    }
}

/// State shared by both ends of a change channel
struct Shared {
    status: Mutex<SourceStatus>,
    stopping: CancellationToken,
}

impl Shared {
    /// Moves out of `Active`; later transitions are ignored.
    fn settle(
        &self,
        next: SourceStatus,
    ) -> bool {
        let mut status = self.status.lock();
        if !status.is_active() {
            return false;
        }
        *status = next;
        true
    }
}

/// Creates a change channel holding at most `buffer` undelivered changes.
pub fn channel<T>(buffer: usize) -> (ChangeSender<T>, ChangeSource<T>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    let shared = Arc::new(Shared {
        status: Mutex::new(SourceStatus::Active),
        stopping: CancellationToken::new(),
    });

    let sender = ChangeSender {
        tx,
        shared: shared.clone(),
    };
    let source = ChangeSource {
        changes: tokio::sync::Mutex::new(rx),
        shared,
    };
    (sender, source)
}

/// Creates a change channel sized by [`WatcherConfig::change_buffer_size`].
pub fn channel_with_config<T>(config: &WatcherConfig) -> (ChangeSender<T>, ChangeSource<T>) {
    channel(config.change_buffer_size)
}

/// Producer end of a change channel
pub struct ChangeSender<T> {
    tx: mpsc::Sender<T>,
    shared: Arc<Shared>,
}

impl<T> ChangeSender<T> {
    /// Queues one change, waiting for buffer space.
    ///
    /// Fails with `StoppedWatcher` once the consumer side has been stopped.
    pub async fn send(
        &self,
        change: T,
    ) -> Result<()> {
        if self.shared.stopping.is_cancelled() {
            return Err(WatcherError::StoppedWatcher.into());
        }
        tokio::select! {
            biased;
            _ = self.shared.stopping.cancelled() => Err(Error::from(WatcherError::StoppedWatcher)),
            sent = self.tx.send(change) => sent.map_err(|_| Error::from(WatcherError::StoppedWatcher)),
        }
    }

    /// Records `err` as the reason this producer gave up, then closes the channel.
    ///
    /// Changes already queued are still delivered; the error is reported after them.
    pub fn fail<E>(
        self,
        err: E,
    ) where
        E: std::error::Error + Send + Sync + 'static,
    {
        if self.shared.settle(SourceStatus::Failed(Arc::new(err))) {
            debug!("change producer failed");
        }
    }

    /// Closes the channel cleanly. Dropping the sender has the same effect.
    pub fn close(self) {}

    /// Resolves once the consumer side has been stopped, so the producer can tear down.
    pub async fn stopped(&self) {
        self.shared.stopping.cancelled().await
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopping.is_cancelled()
    }
}

/// Consumer end of a change channel, held by the resource registry
pub struct ChangeSource<T> {
    changes: tokio::sync::Mutex<mpsc::Receiver<T>>,
    shared: Arc<Shared>,
}

impl<T> ChangeSource<T> {
    /// Blocks until the next change, or returns `None` once the source is terminal.
    ///
    /// Concurrent callers on one source are served one at a time.
    pub async fn next(&self) -> Option<T> {
        let mut changes = self.changes.lock().await;
        let received = tokio::select! {
            biased;
            _ = self.shared.stopping.cancelled() => None,
            change = changes.recv() => change,
        };
        match received {
            Some(change) => {
                trace!("change delivered");
                Some(change)
            }
            None => {
                self.shared.settle(SourceStatus::Stopped);
                None
            }
        }
    }

    /// Error the producer stored before closing, if any.
    pub fn err(&self) -> Option<Error> {
        match &*self.shared.status.lock() {
            SourceStatus::Failed(err) => Some(Error::Stored(err.clone())),
            _ => None,
        }
    }

    /// The error a `Next` call reports once this source is terminal.
    pub fn terminal_error(&self) -> Error {
        self.err().unwrap_or_else(|| WatcherError::StoppedWatcher.into())
    }

    /// Stops the source and wakes any pending `next` call. Idempotent.
    pub fn stop(&self) {
        if self.shared.settle(SourceStatus::Stopped) {
            debug!("change source stopped");
        }
        self.shared.stopping.cancel();
    }

    pub fn status(&self) -> SourceStatus {
        self.shared.status.lock().clone()
    }
}

impl<T> fmt::Debug for ChangeSource<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ChangeSource").field("status", &self.status()).finish_non_exhaustive()
    }
}

/// Bare "something changed" signals
pub type NotifySource = ChangeSource<()>;
/// Lists of identifiers
pub type StringsSource = ChangeSource<Vec<String>>;
