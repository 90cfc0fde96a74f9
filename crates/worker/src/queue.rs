//! Inbound/outbound message queues of the worker.
//!
//! Release requests arrive on one Redis list and results leave on another. The
//! in-memory queue backs tests and local runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::WorkerError;

/// Source of release requests and sink for their results.
#[async_trait::async_trait]
pub trait MessageQueue: Send + Sync {
    /// Wait up to `timeout` for the next inbound payload.
    async fn pop(&self, timeout: Duration) -> Result<Option<String>, WorkerError>;

    /// Publish one result payload.
    async fn push(&self, payload: String) -> Result<(), WorkerError>;
}

/// Redis list pair: BLPOP from `queue_from`, RPUSH to `queue_to`.
#[derive(Debug, Clone)]
pub struct RedisListQueue {
    client: Arc<redis::Client>,
    queue_from: String,
    queue_to: String,
}

impl RedisListQueue {
    pub fn new(
        redis_url: impl AsRef<str>,
        queue_from: impl Into<String>,
        queue_to: impl Into<String>,
    ) -> Result<Self, WorkerError> {
        let client = redis::Client::open(redis_url.as_ref()).map_err(|e| WorkerError::Queue(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
            queue_from: queue_from.into(),
            queue_to: queue_to.into(),
        })
    }

    fn pop_sync(&self, timeout: Duration) -> Result<Option<String>, WorkerError> {
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| WorkerError::Queue(e.to_string()))?;

        let popped: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(&self.queue_from)
            .arg(timeout.as_secs().max(1))
            .query(&mut conn)
            .map_err(|e| WorkerError::Queue(format!("BLPOP failed: {e}")))?;

        Ok(popped.map(|(_, payload)| payload))
    }

    fn push_sync(&self, payload: &str) -> Result<(), WorkerError> {
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| WorkerError::Queue(e.to_string()))?;

        let _: i64 = redis::cmd("RPUSH")
            .arg(&self.queue_to)
            .arg(payload)
            .query(&mut conn)
            .map_err(|e| WorkerError::Queue(format!("RPUSH failed: {e}")))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageQueue for RedisListQueue {
    async fn pop(&self, timeout: Duration) -> Result<Option<String>, WorkerError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.pop_sync(timeout))
            .await
            .map_err(|e| WorkerError::Queue(e.to_string()))?
    }

    async fn push(&self, payload: String) -> Result<(), WorkerError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.push_sync(&payload))
            .await
            .map_err(|e| WorkerError::Queue(e.to_string()))?
    }
}

/// In-memory queue pair for tests/dev.
///
/// `pop` never blocks: an empty inbound queue returns `None` immediately.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    inbound: Mutex<VecDeque<String>>,
    outbound: Mutex<Vec<String>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, payload: impl Into<String>) {
        if let Ok(mut inbound) = self.inbound.lock() {
            inbound.push_back(payload.into());
        }
    }

    pub fn pending(&self) -> usize {
        self.inbound.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Results published so far.
    pub fn published(&self) -> Vec<String> {
        self.outbound.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MessageQueue for InMemoryQueue {
    async fn pop(&self, _timeout: Duration) -> Result<Option<String>, WorkerError> {
        let mut inbound = self
            .inbound
            .lock()
            .map_err(|_| WorkerError::Queue("inbound queue poisoned".to_string()))?;
        Ok(inbound.pop_front())
    }

    async fn push(&self, payload: String) -> Result<(), WorkerError> {
        self.outbound
            .lock()
            .map_err(|_| WorkerError::Queue("outbound queue poisoned".to_string()))?
            .push(payload);
        Ok(())
    }
}

#[async_trait::async_trait]
impl<Q> MessageQueue for Arc<Q>
where
    Q: MessageQueue + ?Sized,
{
    async fn pop(&self, timeout: Duration) -> Result<Option<String>, WorkerError> {
        (**self).pop(timeout).await
    }

    async fn push(&self, payload: String) -> Result<(), WorkerError> {
        (**self).push(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_queue_is_fifo() {
        let queue = InMemoryQueue::new();
        queue.enqueue("a");
        queue.enqueue("b");

        assert_eq!(queue.pop(Duration::from_secs(1)).await.unwrap().as_deref(), Some("a"));
        assert_eq!(queue.pop(Duration::from_secs(1)).await.unwrap().as_deref(), Some("b"));
        assert_eq!(queue.pop(Duration::from_secs(1)).await.unwrap(), None);

        queue.push("out".to_string()).await.unwrap();
        assert_eq!(queue.published(), vec!["out".to_string()]);
    }

    #[test]
    fn invalid_redis_url_is_a_queue_error() {
        assert!(matches!(
            RedisListQueue::new("nope", "in", "out"),
            Err(WorkerError::Queue(_))
        ));
    }
}
