//! Error types for class configuration and value coercion.

use crate::schema::ScalarType;
use fieldcrypt_crypto::CryptoError;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Programmer or deployment errors in how entity classes are declared.
///
/// These are never recovered from at runtime; they always reach the caller.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Encryption was needed but no key resolves anywhere in the hierarchy.
    #[error("no encryption key declared for `{class}` or any of its ancestors")]
    MissingKey { class: String },

    /// Lookup of a class that was never registered.
    #[error("unknown entity class: {0}")]
    UnknownClass(String),

    /// A class names a parent that was never registered.
    #[error("class `{class}` extends unknown class `{parent}`")]
    UnknownParent { class: String, parent: String },

    /// The parent chain loops back on itself.
    #[error("inheritance cycle through `{0}`")]
    InheritanceCycle(String),

    /// Two classes registered under the same name.
    #[error("class `{0}` declared more than once")]
    DuplicateClass(String),

    /// A class lists the same field twice.
    #[error("field `{field}` declared more than once on `{class}`")]
    DuplicateField { class: String, field: String },

    /// A field name that collides with the ciphertext column naming.
    #[error("field `{field}` on `{class}` uses the reserved `encrypted_` prefix")]
    ReservedFieldName { class: String, field: String },

    /// A field or class was declared with an empty name.
    #[error("empty name declared on `{0}`")]
    EmptyName(String),

    /// Key material could not be turned into a key.
    #[error("invalid key for `{class}`: {source}")]
    InvalidKey {
        class: String,
        #[source]
        source: CryptoError,
    },

    /// A configured key variable is not set.
    #[error("environment variable `{var}` holding the key for `{class}` is not set")]
    MissingKeyVariable { class: String, var: String },

    /// The configuration file could not be read or parsed.
    #[error("config file {path}: {message}")]
    ConfigFile { path: String, message: String },
}

/// A plaintext value that cannot be read as its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read {raw:?} as {expected}")]
pub struct CoercionError {
    pub raw: String,
    pub expected: ScalarType,
}
