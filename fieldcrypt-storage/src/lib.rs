//! Row storage for fieldcrypt.
//!
//! This is the persistence boundary the encryption layer plugs into. It knows
//! nothing about encryption:
//!
//! - [`Row`] holds a record's columns exactly as they are stored
//! - [`DirtyTracker`] remembers which attributes changed since the last load
//! - [`Lifecycle`] is implemented by models that want hooks around
//!   [`MemoryStore::save`] and [`MemoryStore::reload`]
//! - [`MemoryStore`] keeps tables of rows in memory, keyed by [`RecordId`]
//!
//! [`RecordId`]: fieldcrypt_types::RecordId

mod dirty;
mod error;
mod lifecycle;
mod row;
mod store;

pub use dirty::DirtyTracker;
pub use error::{StorageError, StorageResult};
pub use lifecycle::{HookError, Lifecycle};
pub use row::Row;
pub use store::MemoryStore;
