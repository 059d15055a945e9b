//! Error types for the storage layer.

use crate::lifecycle::HookError;
use fieldcrypt_types::RecordId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No row with this id in the table.
    #[error("record not found: {table}/{id}")]
    NotFound { table: String, id: RecordId },

    /// Reload was requested for a record that was never saved.
    #[error("record in {0} has not been persisted")]
    NotPersisted(String),

    /// A `before_save` hook rejected the write.
    #[error("before_save hook failed: {0}")]
    Hook(#[source] HookError),

    /// A writer panicked while holding the table lock.
    #[error("storage lock poisoned")]
    LockPoisoned,
}
