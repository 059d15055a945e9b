//! Core type definitions for fieldcrypt.
//!
//! Only identifiers live here. Field metadata and values belong to
//! `fieldcrypt-model`; row plumbing belongs to `fieldcrypt-storage`.

mod ids;

pub use ids::RecordId;
