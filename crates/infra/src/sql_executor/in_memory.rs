//! Scripted SQL executor for tests/dev.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Value as JsonValue};

use super::{SqlExecutor, SqlExecutorError, SqlUpdateRequest};

/// Reply the scripted executor hands out for one request.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Ack(JsonValue),
    Error(SqlExecutorError),
}

impl ScriptedReply {
    pub fn success() -> Self {
        ScriptedReply::Ack(json!({ "result": "success" }))
    }

    pub fn rejected() -> Self {
        ScriptedReply::Ack(json!({ "result": "failure" }))
    }
}

/// In-memory SQL executor.
///
/// - Records every request in arrival order
/// - Replies from a script, one entry per request
/// - Replies `{"result": "success"}` once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedSqlExecutor {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<SqlUpdateRequest>>,
}

impl ScriptedSqlExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next unanswered request.
    pub fn push_reply(&self, reply: ScriptedReply) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    pub fn with_replies(self, replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        for reply in replies {
            self.push_reply(reply);
        }
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SqlUpdateRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Requests received so far for one executor function.
    pub fn requests_for(&self, function: &str) -> Vec<SqlUpdateRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.function == function)
            .collect()
    }
}

#[async_trait::async_trait]
impl SqlExecutor for ScriptedSqlExecutor {
    async fn request(&self, request: SqlUpdateRequest) -> Result<JsonValue, SqlExecutorError> {
        self.requests
            .lock()
            .map_err(|_| SqlExecutorError::Command("request log poisoned".to_string()))?
            .push(request);

        let next = self
            .script
            .lock()
            .map_err(|_| SqlExecutorError::Command("reply script poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(ScriptedReply::success);

        match next {
            ScriptedReply::Ack(ack) => Ok(ack),
            ScriptedReply::Error(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_executor::check_result;

    fn request(function: &str) -> SqlUpdateRequest {
        SqlUpdateRequest {
            message: json!({}),
            function: function.to_string(),
            runtime_session_id: "s".to_string(),
        }
    }

    #[tokio::test]
    async fn replies_follow_script_then_default_to_success() {
        let executor = ScriptedSqlExecutor::new().with_replies([
            ScriptedReply::rejected(),
            ScriptedReply::Error(SqlExecutorError::Timeout(30)),
        ]);

        let first = executor.request(request("PurchaseRequisitionHeader")).await.unwrap();
        assert!(!check_result(&first));

        let second = executor.request(request("PurchaseRequisitionItem")).await;
        assert!(matches!(second, Err(SqlExecutorError::Timeout(30))));

        let third = executor.request(request("PurchaseRequisitionItem")).await.unwrap();
        assert!(check_result(&third));

        assert_eq!(executor.requests().len(), 3);
        assert_eq!(executor.requests_for("PurchaseRequisitionItem").len(), 2);
    }
}
