//! Redis-backed SQL executor client (request stream + per-request reply list).
//!
//! ## Architecture
//!
//! - **Request stream**: each update is XADDed to the executor's stream key with
//!   routing fields and the JSON request as `payload`
//! - **Reply list**: the executor RPUSHes its acknowledgment to the `reply_to` key
//!   named in the request; this client BLPOPs that key with a timeout
//! - **One in flight**: a call owns its reply key, so replies never cross calls

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{SqlExecutor, SqlExecutorError, SqlUpdateRequest};

const DEFAULT_REPLY_PREFIX: &str = "sql-executor:replies";

#[derive(Debug, Clone)]
pub struct RedisSqlExecutor {
    client: Arc<redis::Client>,
    queue_key: String,
    reply_prefix: String,
    reply_timeout: Duration,
}

impl RedisSqlExecutor {
    /// Create a client for the executor listening on `queue_key`.
    ///
    /// `reply_timeout` bounds how long one request waits for its acknowledgment.
    pub fn new(
        redis_url: impl AsRef<str>,
        queue_key: impl Into<String>,
        reply_timeout: Duration,
    ) -> Result<Self, SqlExecutorError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| SqlExecutorError::Connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            queue_key: queue_key.into(),
            reply_prefix: DEFAULT_REPLY_PREFIX.to_string(),
            reply_timeout,
        })
    }

    pub fn with_reply_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reply_prefix = prefix.into();
        self
    }

    fn reply_key(&self, correlation_id: &str) -> String {
        format!("{}:{}", self.reply_prefix, correlation_id)
    }

    #[instrument(
        skip(self, request),
        fields(
            queue_key = %self.queue_key,
            function = %request.function,
            runtime_session_id = %request.runtime_session_id
        ),
        err
    )]
    fn request_sync(&self, request: &SqlUpdateRequest) -> Result<JsonValue, SqlExecutorError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| SqlExecutorError::Serialization(e.to_string()))?;

        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| SqlExecutorError::Connection(e.to_string()))?;

        let correlation_id = Uuid::now_v7().to_string();
        let reply_to = self.reply_key(&correlation_id);

        let message_id: String = redis::cmd("XADD")
            .arg(&self.queue_key)
            .arg("*")
            .arg("correlation_id")
            .arg(&correlation_id)
            .arg("reply_to")
            .arg(&reply_to)
            .arg("function")
            .arg(&request.function)
            .arg("runtime_session_id")
            .arg(&request.runtime_session_id)
            .arg("requested_at")
            .arg(chrono::Utc::now().to_rfc3339())
            .arg("payload")
            .arg(&payload)
            .query(&mut conn)
            .map_err(|e| SqlExecutorError::Command(format!("XADD failed: {e}")))?;

        debug!(%message_id, %correlation_id, "sql update request queued");

        let timeout_secs = self.reply_timeout.as_secs().max(1);
        let reply: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(&reply_to)
            .arg(timeout_secs)
            .query(&mut conn)
            .map_err(|e| SqlExecutorError::Command(format!("BLPOP failed: {e}")))?;

        let (_, body) = reply.ok_or(SqlExecutorError::Timeout(timeout_secs))?;
        parse_reply(&body)
    }
}

fn parse_reply(body: &str) -> Result<JsonValue, SqlExecutorError> {
    serde_json::from_str(body).map_err(|e| SqlExecutorError::Deserialization(e.to_string()))
}

#[async_trait::async_trait]
impl SqlExecutor for RedisSqlExecutor {
    async fn request(&self, request: SqlUpdateRequest) -> Result<JsonValue, SqlExecutorError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.request_sync(&request))
            .await
            .map_err(|e| SqlExecutorError::Join(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_keys_are_namespaced_per_correlation_id() {
        let executor = RedisSqlExecutor::new("redis://127.0.0.1:6379", "sql", Duration::from_secs(5))
            .unwrap()
            .with_reply_prefix("test:replies");
        assert_eq!(executor.reply_key("abc"), "test:replies:abc");
    }

    #[test]
    fn malformed_reply_is_a_deserialization_error() {
        assert!(matches!(parse_reply("not json"), Err(SqlExecutorError::Deserialization(_))));
        assert_eq!(
            parse_reply(r#"{"result":"success"}"#).unwrap(),
            serde_json::json!({ "result": "success" })
        );
    }

    #[test]
    fn invalid_url_is_a_connection_error() {
        let err = RedisSqlExecutor::new("not-a-url", "sql", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SqlExecutorError::Connection(_)));
    }
}
