//! Queue consumption loop.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use requisition_releases_infra::{RowReader, SqlExecutor};

use crate::error::WorkerError;
use crate::handler::ReleaseHandler;
use crate::queue::MessageQueue;

const POLL_TIMEOUT: Duration = Duration::from_secs(1);
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Pops release requests one at a time, handles them, and publishes results.
///
/// Requests are processed strictly sequentially.
#[derive(Debug)]
pub struct ReleaseWorker<R, E, Q> {
    handler: ReleaseHandler<R, E>,
    queue: Q,
    poll_timeout: Duration,
}

impl<R, E, Q> ReleaseWorker<R, E, Q> {
    pub fn new(handler: ReleaseHandler<R, E>, queue: Q) -> Self {
        Self {
            handler,
            queue,
            poll_timeout: POLL_TIMEOUT,
        }
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn handler(&self) -> &ReleaseHandler<R, E> {
        &self.handler
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }
}

impl<R, E, Q> ReleaseWorker<R, E, Q>
where
    R: RowReader,
    E: SqlExecutor,
    Q: MessageQueue,
{
    /// Consume until `shutdown` turns true. Shutdown is checked between polls, so
    /// a popped request is always handled and published.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("releases worker started");

        while !*shutdown.borrow_and_update() {
            match self.queue.pop(self.poll_timeout).await {
                Ok(Some(raw)) => {
                    if let Err(e) = self.process(&raw).await {
                        error!(error = %e, "release request dropped");
                    }
                }
                Ok(None) => tokio::task::yield_now().await,
                Err(e) => {
                    warn!(error = %e, "inbound queue unavailable");
                    tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                }
            }
        }

        info!("releases worker stopped");
    }

    /// Handle one queued payload and publish its result.
    pub async fn process(&self, raw: &str) -> Result<(), WorkerError> {
        let output = self.handler.handle_payload(raw).await?;
        self.queue.push(output).await
    }

    /// Handle everything currently queued, returning how many requests ran.
    ///
    /// Stops at the first empty poll.
    pub async fn drain(&self) -> usize {
        let mut handled = 0;
        while let Ok(Some(raw)) = self.queue.pop(self.poll_timeout).await {
            if let Err(e) = self.process(&raw).await {
                error!(error = %e, "release request dropped");
            }
            handled += 1;
        }
        handled
    }
}
