//! Release cascade orchestration.
//!
//! `ReleaseCaller` turns one release request into a sequence of row updates and
//! sends them to the SQL executor one at a time:
//!
//! ```text
//! accepter entry
//!   ├─ Header: read header → overwrite flag → update
//!   │            └─ released?  read items → overwrite flags → update each
//!   └─ Item:   update each requested item
//!                └─ first item un-released?  read header → un-release → update
//! ```
//!
//! A failed update records the failure on the output and ends that branch. The
//! remaining accepter entries still run, and the caller always gets back whatever
//! was written successfully.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use requisition_releases_core::cascade::{
    batch_forces_header_unrelease, cascade_to_items, header_release_cascades, item_updates,
};
use requisition_releases_core::{
    ApiType, EntityKind, Header, Item, ReleaseInput, ReleaseMessage, ReleaseOutput, UpdateFailure,
};

use crate::read_model::RowReader;
use crate::sql_executor::{check_result, SqlExecutor, SqlUpdateRequest};

/// Orchestrator holding the injected row reader and SQL executor.
#[derive(Debug)]
pub struct ReleaseCaller<R, E> {
    reader: R,
    executor: E,
}

impl<R, E> ReleaseCaller<R, E> {
    pub fn new(reader: R, executor: E) -> Self {
        Self { reader, executor }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_parts(self) -> (R, E) {
        (self.reader, self.executor)
    }
}

impl<R, E> ReleaseCaller<R, E>
where
    R: RowReader,
    E: SqlExecutor,
{
    /// Run the requested API type. Only `releases` is served; any other type is
    /// logged and yields no message.
    #[instrument(
        skip_all,
        fields(
            api_type = %input.api_type,
            purchase_requisition = %input.purchase_requisition(),
            runtime_session_id = %input.runtime_session_id
        )
    )]
    pub async fn async_releases(
        &self,
        accepter: &[EntityKind],
        input: &ReleaseInput,
        output: &mut ReleaseOutput,
    ) -> Option<ReleaseMessage> {
        match input.parsed_api_type() {
            Ok(ApiType::Releases) => Some(self.release_sql_process(accepter, input, output).await),
            Err(e) => {
                error!(error = %e, "unsupported api type");
                None
            }
        }
    }

    /// Process accepter entries in order and collect the written rows.
    pub async fn release_sql_process(
        &self,
        accepter: &[EntityKind],
        input: &ReleaseInput,
        output: &mut ReleaseOutput,
    ) -> ReleaseMessage {
        let mut message = ReleaseMessage::default();

        for kind in accepter {
            match kind {
                EntityKind::Header => {
                    let (header, items) = self.header_release(input, output).await;
                    message.header = header;
                    message.item.extend(items);
                }
                EntityKind::Item => {
                    if let Some((forced_header, items)) = self.item_release(input, output).await {
                        if forced_header.is_some() {
                            message.header = forced_header;
                        }
                        message.item.extend(items);
                    }
                }
            }
        }

        info!(
            header_written = message.header.is_some(),
            items_written = message.item.len(),
            failed = output.has_failed(),
            "release pass finished"
        );
        message
    }

    /// Header-triggered change. Releasing the header cascades to every stored item.
    async fn header_release(
        &self,
        input: &ReleaseInput,
        output: &mut ReleaseOutput,
    ) -> (Option<Header>, Vec<Item>) {
        let key = input.purchase_requisition();
        let session = input.runtime_session_id.as_str();

        let Some(stored) = self.reader.read_header(key).await else {
            warn!(purchase_requisition = %key, "header not found; nothing to release");
            return (None, vec![]);
        };

        let header = stored.with_released(input.header.is_released);
        if !self.send_update(EntityKind::Header, &header, session).await {
            output.record_failure(UpdateFailure::Header);
            return (None, vec![]);
        }

        // Un-releasing a header leaves its items as they are.
        if !header_release_cascades(header.is_released) {
            return (Some(header), vec![]);
        }

        let items = cascade_to_items(self.reader.read_items(key).await, header.is_released);
        for item in &items {
            if !self.send_update(EntityKind::Item, item, session).await {
                output.record_failure(UpdateFailure::Item);
                return (None, vec![]);
            }
        }

        (Some(header), items)
    }

    /// Item-triggered change. An un-released first item forces the header
    /// un-released as well.
    ///
    /// Returns `None` when any update of the branch failed.
    async fn item_release(
        &self,
        input: &ReleaseInput,
        output: &mut ReleaseOutput,
    ) -> Option<(Option<Header>, Vec<Item>)> {
        let key = input.purchase_requisition();
        let session = input.runtime_session_id.as_str();

        let items = item_updates(&input.header);
        for item in &items {
            if !self.send_update(EntityKind::Item, item, session).await {
                output.record_failure(UpdateFailure::Item);
                return None;
            }
        }

        if !batch_forces_header_unrelease(&input.header) {
            return Some((None, items));
        }

        let Some(stored) = self.reader.read_header(key).await else {
            error!(purchase_requisition = %key, "header not found; cannot force un-release");
            output.record_failure(UpdateFailure::Header);
            return None;
        };

        let header = stored.with_released(Some(false));
        if !self.send_update(EntityKind::Header, &header, session).await {
            output.record_failure(UpdateFailure::Header);
            return None;
        }

        Some((Some(header), items))
    }

    /// Send one row and wait for its acknowledgment. Transport errors and
    /// non-success replies both come back as `false`.
    async fn send_update<T>(&self, kind: EntityKind, row: &T, session: &str) -> bool
    where
        T: Serialize + Sync,
    {
        let request = match SqlUpdateRequest::new(kind, row, session) {
            Ok(request) => request,
            Err(e) => {
                error!(function = kind.function_name(), error = %e, "failed to build sql update");
                return false;
            }
        };

        match self.executor.request(request).await {
            Ok(ack) if check_result(&ack) => true,
            Ok(ack) => {
                warn!(function = kind.function_name(), %ack, "sql executor did not report success");
                false
            }
            Err(e) => {
                error!(function = kind.function_name(), error = %e, "sql executor request failed");
                false
            }
        }
    }
}
