use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Poll timeout of the drain loop while the token is unset.
const POLL_TIMEOUT: Duration = Duration::from_millis(500);
/// Timeout of each flush pass after cancellation.
const FLUSH_TIMEOUT: Duration = Duration::from_millis(100);

/// Non-blocking, ordered log sink decoupling message production from console
/// output.
///
/// Producers enqueue lines through cloneable [`ConsoleWriter`] handles; a
/// single background drain task prints them. Slow console I/O therefore never
/// backpressures the replay pipelines. Order is preserved per producer; no
/// ordering is guaranteed between concurrent producers.
///
/// Once the cancellation token fires, the drain task flushes the remaining
/// backlog with a short timeout and terminates. [`done`](Self::done) awaits
/// that flush.
pub struct AsyncConsole {
    sender: mpsc::UnboundedSender<String>,
    writer_task: JoinHandle<()>,
}

impl AsyncConsole {
    /// Creates a console draining to stdout.
    pub fn new(cancel: CancellationToken) -> Self {
        Self::with_writer(cancel, |line| println!("{line}"))
    }

    /// Creates a console draining into `write`. Used by tests to capture
    /// output; the drain semantics are identical to [`new`](Self::new).
    pub fn with_writer<W>(cancel: CancellationToken, mut write: W) -> Self
    where
        W: FnMut(String) + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            while !cancel.is_cancelled() {
                match timeout(POLL_TIMEOUT, receiver.recv()).await {
                    Ok(Some(line)) => write(line),
                    // All writers dropped and the backlog is empty.
                    Ok(None) => return,
                    Err(_) => {}
                }
            }

            // Cancelled: flush whatever is still queued, then stop.
            while let Ok(Some(line)) = timeout(FLUSH_TIMEOUT, receiver.recv()).await {
                write(line);
            }
        });

        AsyncConsole {
            sender,
            writer_task,
        }
    }

    /// Returns a handle producers use to enqueue lines.
    pub fn writer(&self) -> ConsoleWriter {
        ConsoleWriter {
            sender: self.sender.clone(),
        }
    }

    /// Awaits the drain task; returns once all backlog has been flushed.
    ///
    /// All [`ConsoleWriter`] handles must be dropped first, otherwise the
    /// drain loop keeps waiting for more lines until cancellation.
    pub async fn done(self) {
        let AsyncConsole {
            sender,
            writer_task,
        } = self;
        drop(sender);
        if writer_task.await.is_err() {
            log::warn!("console writer task panicked");
        }
    }
}

/// Cloneable producer handle for [`AsyncConsole`].
#[derive(Clone)]
pub struct ConsoleWriter {
    sender: mpsc::UnboundedSender<String>,
}

impl ConsoleWriter {
    /// Enqueues one line without waiting for it to be printed.
    pub fn write_line(&self, line: impl Into<String>) {
        if self.sender.send(line.into()).is_err() {
            // The drain task already finished its final flush.
            log::debug!("console closed, dropping log line");
        }
    }
}
