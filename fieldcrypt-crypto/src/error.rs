//! Error types for the encryption primitive.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The payload failed tag verification (wrong key or tampered data).
    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    /// The payload could not be parsed into nonce and ciphertext.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Key material has the wrong size.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Key material could not be decoded.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

impl CryptoError {
    /// True when the failure came from tag verification rather than a
    /// malformed payload.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
