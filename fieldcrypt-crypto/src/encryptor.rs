//! Encryption adapter consumed by the field layer.
//!
//! Entity classes hold an `Arc<dyn FieldEncryptor>`; they never see raw keys.
//! [`KeyedEncryptor`] is the production implementation. Tests substitute
//! their own implementations to observe how often the cipher is reached.

use crate::cipher;
use crate::error::CryptoResult;
use crate::key::FieldKey;

/// Encrypt-and-sign / decrypt-and-verify over string field values.
///
/// Implementations own the key material and must be safe to share across
/// threads once configured.
pub trait FieldEncryptor: Send + Sync {
    /// Seal `plaintext` into an opaque column value.
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String>;

    /// Open a column value produced by `encrypt`. Fails with
    /// `CryptoError::Authentication` on tampered or foreign-key input.
    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String>;
}

/// ChaCha20-Poly1305 encryptor bound to one [`FieldKey`].
#[derive(Debug, Clone)]
pub struct KeyedEncryptor {
    key: FieldKey,
}

impl KeyedEncryptor {
    pub fn new(key: FieldKey) -> Self {
        Self { key }
    }

    /// Builds an encryptor straight from configured key material.
    pub fn from_material(material: &str) -> CryptoResult<Self> {
        FieldKey::from_material(material).map(Self::new)
    }
}

impl FieldEncryptor for KeyedEncryptor {
    fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        cipher::seal_str(&self.key, plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> CryptoResult<String> {
        cipher::open_str(&self.key, ciphertext)
    }
}
