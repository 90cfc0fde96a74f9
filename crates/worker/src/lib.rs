//! Releases worker: consumes release requests from a queue, runs the cascade,
//! and publishes the result document.

pub mod error;
pub mod handler;
pub mod queue;
pub mod worker;

pub use error::WorkerError;
pub use handler::ReleaseHandler;
pub use queue::{InMemoryQueue, MessageQueue, RedisListQueue};
pub use worker::ReleaseWorker;
