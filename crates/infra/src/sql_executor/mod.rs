//! Request/acknowledge exchange with the queue-backed SQL executor.
//!
//! Every update is one request that blocks until the executor replies. A reply
//! counts as success only when it carries `result == "success"`; anything else,
//! including transport errors, is a failed update.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis_stream;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use requisition_releases_core::EntityKind;

pub use in_memory::{ScriptedReply, ScriptedSqlExecutor};
#[cfg(feature = "redis")]
pub use redis_stream::RedisSqlExecutor;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SqlExecutorError {
    #[error("queue connection error: {0}")]
    Connection(String),

    #[error("queue command error: {0}")]
    Command(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("no reply from sql executor within {0}s")]
    Timeout(u64),

    #[error("request task failed: {0}")]
    Join(String),
}

/// One row update for the SQL executor.
///
/// Serializes as `{ "message": <row>, "function": <table function>, "runtime_session_id": <token> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlUpdateRequest {
    pub message: JsonValue,
    pub function: String,
    pub runtime_session_id: String,
}

impl SqlUpdateRequest {
    pub fn new<T: Serialize>(
        kind: EntityKind,
        row: &T,
        runtime_session_id: impl Into<String>,
    ) -> Result<Self, SqlExecutorError> {
        let message =
            serde_json::to_value(row).map_err(|e| SqlExecutorError::Serialization(e.to_string()))?;
        Ok(Self {
            message,
            function: kind.function_name().to_string(),
            runtime_session_id: runtime_session_id.into(),
        })
    }
}

/// Queue-backed SQL executor client.
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Send one update and wait for its correlated acknowledgment payload.
    async fn request(&self, request: SqlUpdateRequest) -> Result<JsonValue, SqlExecutorError>;
}

#[async_trait::async_trait]
impl<S> SqlExecutor for Arc<S>
where
    S: SqlExecutor + ?Sized,
{
    async fn request(&self, request: SqlUpdateRequest) -> Result<JsonValue, SqlExecutorError> {
        (**self).request(request).await
    }
}

/// Whether an acknowledgment reports success. Fails closed on any other shape.
pub fn check_result(ack: &JsonValue) -> bool {
    ack.get("result").and_then(JsonValue::as_str) == Some("success")
}

#[cfg(test)]
mod tests {
    use super::*;
    use requisition_releases_core::{Header, PurchaseRequisitionId};
    use serde_json::json;

    #[test]
    fn only_string_success_passes() {
        assert!(check_result(&json!({ "result": "success" })));
        assert!(!check_result(&json!({ "result": "failure" })));
        assert!(!check_result(&json!({ "result": true })));
        assert!(!check_result(&json!({ "status": "success" })));
        assert!(!check_result(&json!("success")));
        assert!(!check_result(&JsonValue::Null));
    }

    #[test]
    fn request_has_executor_wire_shape() {
        let header = Header::new(PurchaseRequisitionId::new(100), Some(true));
        let request = SqlUpdateRequest::new(EntityKind::Header, &header, "session-1").unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": { "PurchaseRequisition": 100, "IsReleased": true },
                "function": "PurchaseRequisitionHeader",
                "runtime_session_id": "session-1"
            })
        );
    }
}
