use drypos_core::RecordKind;
use thiserror::Error;

/// Errors raised by the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be created, opened or migrated
    #[error("Local store unavailable: {0}")]
    Unavailable(String),

    /// `transact` was called from inside another transaction
    #[error("A transaction is already open on this task")]
    TransactionConflict,

    #[error("{kind} '{id}' already exists")]
    DuplicateKey { kind: RecordKind, id: String },

    #[error("Invalid filter field '{0}'")]
    InvalidField(&'static str),

    #[error("Failed to encode or decode {kind} record: {source}")]
    Serialization {
        kind: RecordKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True for errors the caller may retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::TransactionConflict)
    }
}
