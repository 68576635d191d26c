use drypos_core::{RecordKind, RemoteError, ValidationError};
use thiserror::Error;

use crate::db::StoreError;

/// Errors surfaced to callers of the point-of-sale core.
///
/// Read paths never produce `RemoteWrite`; remote failures there are logged
/// and the local copy is returned instead.
#[derive(Debug, Error)]
pub enum PosError {
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Remote write failed: {0}")]
    RemoteWrite(#[source] RemoteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another customer or employee of the same business already uses this value
    #[error("{field} '{value}' is already in use")]
    DuplicateField { field: &'static str, value: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },
}

impl PosError {
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        PosError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for errors the caller may retry unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            PosError::Storage(e) => e.is_retryable(),
            PosError::RemoteWrite(e) => e.is_transient(),
            _ => false,
        }
    }
}
