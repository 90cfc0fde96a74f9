//! Baseline row reads for the release cascade.
//!
//! Readers surface storage failures as "not found" / empty: the orchestrator only
//! needs a baseline row to overwrite, never the reason it is missing.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use requisition_releases_core::{Header, Item, PurchaseRequisitionId};

pub use in_memory::InMemoryRowReader;
pub use postgres::PostgresRowReader;

/// Storage failure while reading baseline rows.
#[derive(Debug, thiserror::Error)]
pub enum RowReaderError {
    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    #[error("failed to decode {operation} row: {message}")]
    Decode { operation: &'static str, message: String },
}

/// Read access to current header and item rows of a purchase requisition.
#[async_trait::async_trait]
pub trait RowReader: Send + Sync {
    /// Current header row, or `None` when absent or unreadable.
    async fn read_header(&self, key: PurchaseRequisitionId) -> Option<Header>;

    /// Current item rows under the header; empty when absent or unreadable.
    async fn read_items(&self, key: PurchaseRequisitionId) -> Vec<Item>;
}

#[async_trait::async_trait]
impl<S> RowReader for Arc<S>
where
    S: RowReader + ?Sized,
{
    async fn read_header(&self, key: PurchaseRequisitionId) -> Option<Header> {
        (**self).read_header(key).await
    }

    async fn read_items(&self, key: PurchaseRequisitionId) -> Vec<Item> {
        (**self).read_items(key).await
    }
}
