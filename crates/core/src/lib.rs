//! `requisition-releases-core`: purchase requisition release domain.
//!
//! This crate contains **pure domain** types and cascade rules (no infrastructure concerns).

pub mod cascade;
pub mod document;
pub mod error;
pub mod id;
pub mod requisition;

pub use cascade::UpdateFailure;
pub use document::{
    ApiType, EntityKind, HeaderInput, ItemInput, ReleaseInput, ReleaseMessage, ReleaseOutput,
};
pub use error::{DomainError, DomainResult};
pub use id::{PurchaseRequisitionId, PurchaseRequisitionItemId};
pub use requisition::{Header, Item, ReleaseFlag};
