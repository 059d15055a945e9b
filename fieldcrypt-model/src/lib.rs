//! Entity class model for fieldcrypt.
//!
//! Defines everything that is fixed once the application has booted:
//! - [`FieldDescriptor`] / [`ScalarType`]: which logical fields are encrypted
//!   and how their plaintext is read back
//! - [`Value`]: typed field values and best-effort coercion from plaintext
//! - [`ClassBuilder`] / [`RegistryBuilder`]: class-definition-time
//!   declarations (key, fields, parent class)
//! - [`Registry`] / [`ResolvedClass`]: the frozen, inheritance-resolved view
//!   shared by every record
//! - [`FieldCryptConfig`] / [`ReadPolicy`]: deployment configuration
//!
//! Per-record state lives in `fieldcrypt-record`.

mod class;
mod config;
mod error;
mod registry;
mod schema;
mod value;

pub use class::{Accessor, ClassBuilder, ResolvedClass};
pub use config::{CoercionFailure, DecryptFailure, FieldCryptConfig, ReadPolicy};
pub use error::{CoercionError, ConfigResult, ConfigurationError};
pub use registry::{Registry, RegistryBuilder};
pub use schema::{
    ciphertext_column, is_ciphertext_column, FieldDescriptor, FieldSpec, ScalarType,
    CIPHERTEXT_COLUMN_PREFIX,
};
pub use value::Value;
