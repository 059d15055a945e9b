//! Deployment configuration, read from `fieldcrypt.toml`.
//!
//! ```toml
//! [read]
//! decrypt_failure = "absent"   # absent | retry | raise
//! coercion_failure = "absent"  # absent | raise
//!
//! [keys]
//! User = "FIELDCRYPT_USER_KEY"
//! ```
//!
//! `[keys]` maps an entity class to the environment variable holding its key
//! material, so keys never sit in the file itself.

use crate::error::{ConfigResult, ConfigurationError};
use fieldcrypt_crypto::{FieldEncryptor, KeyedEncryptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// What a read does when stored ciphertext fails to decrypt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptFailure {
    /// Resolve to an absent value and cache it until the next reload.
    #[default]
    Absent,
    /// Resolve to an absent value and try again on the next read.
    Retry,
    /// Return the error to the caller.
    Raise,
}

/// What a typed read does when plaintext does not parse as the field's type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionFailure {
    /// Resolve to an absent value.
    #[default]
    Absent,
    /// Return the error to the caller.
    Raise,
}

/// Failure handling on the read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPolicy {
    #[serde(default)]
    pub decrypt_failure: DecryptFailure,
    #[serde(default)]
    pub coercion_failure: CoercionFailure,
}

impl ReadPolicy {
    /// Every failure surfaces as an error.
    pub fn strict() -> Self {
        Self {
            decrypt_failure: DecryptFailure::Raise,
            coercion_failure: CoercionFailure::Raise,
        }
    }
}

/// Parsed `fieldcrypt.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCryptConfig {
    #[serde(default)]
    pub read: ReadPolicy,
    /// Class name to environment variable name.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl FieldCryptConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigurationError::ConfigFile {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No fieldcrypt config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file_error = |message: String| ConfigurationError::ConfigFile {
            path: path.display().to_string(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let config: Self = toml::from_str(&contents).map_err(|e| file_error(e.to_string()))?;

        info!(
            "Loaded fieldcrypt config from {:?} ({} class keys)",
            path,
            config.keys.len()
        );
        Ok(config)
    }

    /// Builds an encryptor for every `[keys]` entry from the process
    /// environment.
    pub fn resolve_keys(&self) -> ConfigResult<Vec<(String, Arc<dyn FieldEncryptor>)>> {
        self.resolve_keys_with(|var| std::env::var(var).ok())
    }

    /// Like [`resolve_keys`](Self::resolve_keys) with an explicit variable
    /// lookup.
    pub fn resolve_keys_with<F>(&self, lookup: F) -> ConfigResult<Vec<(String, Arc<dyn FieldEncryptor>)>>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.keys
            .iter()
            .map(|(class, var)| {
                let material = lookup(var).ok_or_else(|| ConfigurationError::MissingKeyVariable {
                    class: class.clone(),
                    var: var.clone(),
                })?;
                let encryptor = KeyedEncryptor::from_material(&material).map_err(|source| {
                    ConfigurationError::InvalidKey {
                        class: class.clone(),
                        source,
                    }
                })?;
                Ok((class.clone(), Arc::new(encryptor) as Arc<dyn FieldEncryptor>))
            })
            .collect()
    }
}
