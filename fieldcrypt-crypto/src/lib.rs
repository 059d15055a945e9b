//! Authenticated encryption for individual record fields.
//!
//! Provides the primitive the field layer sits on:
//! - ChaCha20-Poly1305 for authenticated encryption
//! - 256-bit keys supplied as raw material, zeroized on drop
//! - A [`FieldEncryptor`] trait so callers never touch key bytes
//!
//! # Wire format
//!
//! Every ciphertext is `base64(nonce || ciphertext || tag)` with a fresh
//! random 96-bit nonce, so encrypting the same plaintext twice yields two
//! different strings. Decrypting with the wrong key, or after any byte of the
//! payload has changed, fails with [`CryptoError::Authentication`].

mod cipher;
mod encryptor;
mod error;
mod key;

pub use cipher::{open, open_str, seal, seal_str, SealedValue, NONCE_SIZE, TAG_SIZE};
pub use encryptor::{FieldEncryptor, KeyedEncryptor};
pub use error::{CryptoError, CryptoResult};
pub use key::{generate_random_key, FieldKey, BASE64_KEY_PREFIX, KEY_SIZE};
