//! Error types for record operations.

use fieldcrypt_crypto::CryptoError;
use fieldcrypt_model::{CoercionError, ConfigurationError};
use fieldcrypt_storage::StorageError;
use thiserror::Error;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors surfaced by [`EncryptedRecord`](crate::EncryptedRecord).
///
/// Decrypt and coercion failures only appear here when the class's read
/// policy asks for them; by default they read as absent values.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Missing key or other declaration problem. Always surfaced.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The name is not an effective encrypted field of the record's class.
    #[error("unknown encrypted field `{field}` on `{class}`")]
    UnknownField { class: String, field: String },

    #[error("failed to decrypt `{field}`: {source}")]
    Decrypt {
        field: String,
        #[source]
        source: CryptoError,
    },

    #[error("failed to encrypt `{field}`: {source}")]
    Encrypt {
        field: String,
        #[source]
        source: CryptoError,
    },

    #[error("cannot read `{field}`: {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RecordError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
