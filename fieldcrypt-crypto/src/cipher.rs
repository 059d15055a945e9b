//! ChaCha20-Poly1305 sealing of single column values.
//!
//! A sealed column holds `base64(nonce || ciphertext || tag)` with a fresh
//! nonce per call.

use crate::error::{CryptoError, CryptoResult};
use crate::key::FieldKey;
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// A column value split into its nonce and its tagged ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedValue {
    nonce: [u8; NONCE_SIZE],
    body: Vec<u8>,
}

impl SealedValue {
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Ciphertext with the tag appended.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Splits a stored column. Values too short to carry a nonce and a tag
    /// are rejected here, before any cipher work.
    pub fn from_column(column: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(column.trim())
            .map_err(|e| CryptoError::Decryption(format!("invalid base64: {e}")))?;
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption(format!(
                "column holds {} bytes, need at least {}",
                bytes.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce, body) = bytes.split_at(NONCE_SIZE);
        Ok(Self {
            nonce: nonce.try_into().map_err(|_| {
                CryptoError::Decryption("nonce has the wrong length".to_string())
            })?,
            body: body.to_vec(),
        })
    }

    pub fn to_column(&self) -> String {
        STANDARD.encode([self.nonce.as_slice(), self.body.as_slice()].concat())
    }
}

fn cipher_for(key: &FieldKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(key.as_bytes().into())
}

/// Seals `plaintext` under `key`.
pub fn seal(key: &FieldKey, plaintext: &[u8]) -> CryptoResult<SealedValue> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let body = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(SealedValue { nonce, body })
}

/// Opens a sealed value.
///
/// A tag mismatch is [`CryptoError::Authentication`]: a wrong key and a
/// modified column look the same.
pub fn open(key: &FieldKey, sealed: &SealedValue) -> CryptoResult<Vec<u8>> {
    cipher_for(key)
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.body.as_slice())
        .map_err(|_| CryptoError::Authentication)
}

/// Seals a string straight into its column form.
pub fn seal_str(key: &FieldKey, plaintext: &str) -> CryptoResult<String> {
    seal(key, plaintext.as_bytes()).map(|sealed| sealed.to_column())
}

/// Opens a column back into a string.
pub fn open_str(key: &FieldKey, column: &str) -> CryptoResult<String> {
    let plaintext = open(key, &SealedValue::from_column(column)?)?;
    String::from_utf8(plaintext).map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
