//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic failures of interpreting a release request belong here.
/// Storage and queue failures are modelled by the infrastructure crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An accepter entry named an entity this service does not handle.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// The request asked for an API type this service does not serve.
    #[error("unknown api type: {0}")]
    UnknownApiType(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity(name.into())
    }

    pub fn unknown_api_type(name: impl Into<String>) -> Self {
        Self::UnknownApiType(name.into())
    }
}
