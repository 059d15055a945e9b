//! Field encryption keys.
//!
//! Keys are supplied as raw material at startup. There is no derivation step:
//! the material must already be 256 bits.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of encryption keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Prefix marking key material as standard base64 rather than raw bytes.
pub const BASE64_KEY_PREFIX: &str = "base64:";

/// A field encryption key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FieldKey {
    bytes: [u8; KEY_SIZE],
}

impl FieldKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parses key material as declared in configuration.
    ///
    /// Accepts either exactly [`KEY_SIZE`] bytes of UTF-8 material, or
    /// `base64:` followed by the standard base64 encoding of [`KEY_SIZE`]
    /// bytes.
    pub fn from_material(material: &str) -> CryptoResult<Self> {
        let decoded;
        let raw: &[u8] = match material.strip_prefix(BASE64_KEY_PREFIX) {
            Some(encoded) => {
                decoded = Zeroizing::new(
                    STANDARD
                        .decode(encoded.trim())
                        .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?,
                );
                decoded.as_slice()
            }
            None => material.as_bytes(),
        };

        if raw.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: raw.len(),
            });
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encodes the key as `base64:`-prefixed material, the inverse of
    /// [`FieldKey::from_material`].
    pub fn to_material(&self) -> String {
        format!("{BASE64_KEY_PREFIX}{}", STANDARD.encode(self.bytes))
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generates a random field key.
pub fn generate_random_key() -> FieldKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    FieldKey::from_bytes(bytes)
}
