#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The inbound payload is not a release request.
    #[error("malformed release request: {0}")]
    MalformedInput(String),

    #[error("failed to serialize release output: {0}")]
    Serialization(String),

    #[error("queue error: {0}")]
    Queue(String),
}
