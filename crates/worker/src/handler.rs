//! Request → result document for one inbound message.

use tracing::{info, warn};

use requisition_releases_core::{EntityKind, ReleaseInput, ReleaseOutput};
use requisition_releases_infra::{ReleaseCaller, RowReader, SqlExecutor};

use crate::error::WorkerError;

/// Wraps the orchestrator with input parsing and output formatting.
#[derive(Debug)]
pub struct ReleaseHandler<R, E> {
    caller: ReleaseCaller<R, E>,
}

impl<R, E> ReleaseHandler<R, E> {
    pub fn new(caller: ReleaseCaller<R, E>) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &ReleaseCaller<R, E> {
        &self.caller
    }
}

impl<R, E> ReleaseHandler<R, E>
where
    R: RowReader,
    E: SqlExecutor,
{
    /// Run one release request and build its result document.
    pub async fn handle(&self, input: &ReleaseInput) -> ReleaseOutput {
        let accepter = accepted_entities(input);
        let mut output = ReleaseOutput::for_input(input);

        let message = self.caller.async_releases(&accepter, input, &mut output).await;
        output.finish(message);

        info!(
            runtime_session_id = %output.runtime_session_id,
            sql_update_result = ?output.sql_update_result,
            "release request handled"
        );
        output
    }

    /// Parse a raw inbound payload, handle it, and serialize the result.
    pub async fn handle_payload(&self, raw: &str) -> Result<String, WorkerError> {
        let input: ReleaseInput =
            serde_json::from_str(raw).map_err(|e| WorkerError::MalformedInput(e.to_string()))?;

        let output = self.handle(&input).await;
        serde_json::to_string(&output).map_err(|e| WorkerError::Serialization(e.to_string()))
    }
}

/// Accepter entries this service handles, in request order. Unknown names are skipped.
fn accepted_entities(input: &ReleaseInput) -> Vec<EntityKind> {
    input
        .entity_kinds()
        .filter_map(|parsed| match parsed {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!(runtime_session_id = %input.runtime_session_id, error = %e, "skipping accepter entry");
                None
            }
        })
        .collect()
}
