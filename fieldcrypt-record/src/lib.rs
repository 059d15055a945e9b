//! Transparent field-level encryption for stored records.
//!
//! An [`EncryptedRecord`] wraps a storage row whose encrypted fields live in
//! `encrypted_<field>` columns. Callers read and write plaintext; the record
//! decrypts lazily on first read and encrypts every pending field in its
//! `before_save` hook, so storage only ever sees ciphertext.
//!
//! # Field lifecycle
//!
//! Each field moves through a [`FieldState`]:
//!
//! - `Unloaded`: freshly loaded or reloaded; nothing decrypted yet
//! - `PlaintextLoaded`: plaintext cached and in sync with the column
//! - `PendingEncryption`: plaintext assigned but not yet written as
//!   ciphertext
//!
//! Setters never reach the cipher. Saving encrypts each pending field once,
//! however many times it was assigned. Reloading drops every cached value.
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .class(ClassBuilder::new("Person")
//!         .declare_key(&key_material)
//!         .declare_fields(["ssn"])
//!         .declare_fields([("dob", ScalarType::Date)]))
//!     .build()?;
//!
//! let mut person = EncryptedRecord::new(registry.class("Person")?);
//! person.set("ssn", "123-45-6789")?;
//! let id = person.save(&store)?;
//! ```

mod accessor;
mod error;
mod record;
mod snapshot;
mod state;

pub use accessor::Field;
pub use error::{RecordError, RecordResult};
pub use record::EncryptedRecord;
pub use state::{FieldState, StateTable};
