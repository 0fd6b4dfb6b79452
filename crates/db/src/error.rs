//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Accessed before the snapshot finished loading.
    #[error("database not initialized properly")]
    NotInitialized,

    /// Record not found.
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: u64 },

    /// A unique index rejected the write.
    #[error("{collection}.{field} must be unique, '{value}' already exists")]
    UniqueViolation {
        collection: &'static str,
        field: &'static str,
        value: String,
    },

    /// Snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file could not be (de)serialized.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(collection: &'static str, id: u64) -> Self {
        Self::NotFound { collection, id }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
