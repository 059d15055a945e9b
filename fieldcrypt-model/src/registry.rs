//! Process-wide entity class registry.
//!
//! Classes are declared on a [`RegistryBuilder`] during startup and frozen
//! into an immutable [`Registry`]. After `build()` nothing can be declared,
//! so records may share the registry across threads without locking.

use crate::class::{ClassBuilder, ClassDecl, ResolvedClass};
use crate::config::{FieldCryptConfig, ReadPolicy};
use crate::error::{ConfigResult, ConfigurationError};
use fieldcrypt_crypto::FieldEncryptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Collects class declarations during startup.
#[derive(Default)]
pub struct RegistryBuilder {
    classes: Vec<ClassBuilder>,
    default_policy: ReadPolicy,
    configured_keys: Vec<(String, Arc<dyn FieldEncryptor>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class declaration.
    pub fn class(mut self, class: ClassBuilder) -> Self {
        self.classes.push(class);
        self
    }

    /// Read policy for classes that do not override it.
    pub fn default_policy(mut self, policy: ReadPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Applies a loaded config file: its read policy becomes the default and
    /// its `[keys]` entries are resolved from the process environment.
    pub fn apply_config(self, config: &FieldCryptConfig) -> ConfigResult<Self> {
        let keys = config.resolve_keys()?;
        Ok(self.with_config_keys(config.read, keys))
    }

    /// Like [`apply_config`](Self::apply_config) with an explicit variable
    /// lookup instead of the process environment.
    pub fn apply_config_with<F>(self, config: &FieldCryptConfig, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = config.resolve_keys_with(lookup)?;
        Ok(self.with_config_keys(config.read, keys))
    }

    fn with_config_keys(mut self, policy: ReadPolicy, keys: Vec<(String, Arc<dyn FieldEncryptor>)>) -> Self {
        self.default_policy = policy;
        self.configured_keys.extend(keys);
        self
    }

    /// Validates every declaration, resolves inheritance and freezes the
    /// result.
    ///
    /// Keys from configuration replace keys declared in code for the same
    /// class.
    pub fn build(self) -> ConfigResult<Registry> {
        let mut decls: HashMap<String, ClassDecl> = HashMap::with_capacity(self.classes.len());
        for class in self.classes {
            let decl = class.into_decl()?;
            if decls.contains_key(&decl.name) {
                return Err(ConfigurationError::DuplicateClass(decl.name));
            }
            decls.insert(decl.name.clone(), decl);
        }

        for (class, encryptor) in self.configured_keys {
            let decl = decls
                .get_mut(&class)
                .ok_or_else(|| ConfigurationError::UnknownClass(class.clone()))?;
            decl.key = Some(encryptor);
        }

        let mut classes = HashMap::with_capacity(decls.len());
        for name in decls.keys() {
            let chain = lineage(&decls, name)?;
            let resolved = ResolvedClass::resolve(&chain, self.default_policy);
            debug!(
                "Resolved class {} (table={}, fields={}, key={})",
                resolved.name(),
                resolved.table(),
                resolved.fields().len(),
                resolved.has_key()
            );
            classes.insert(name.clone(), Arc::new(resolved));
        }

        info!("Registered {} encrypted entity classes", classes.len());
        Ok(Registry { classes })
    }
}

/// Walks from `name` to the hierarchy root.
fn lineage<'a>(decls: &'a HashMap<String, ClassDecl>, name: &str) -> ConfigResult<Vec<&'a ClassDecl>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = decls
        .get(name)
        .ok_or_else(|| ConfigurationError::UnknownClass(name.to_string()))?;

    loop {
        if !seen.insert(current.name.as_str()) {
            return Err(ConfigurationError::InheritanceCycle(current.name.clone()));
        }
        chain.push(current);

        let Some(parent) = &current.parent else {
            return Ok(chain);
        };
        current = decls.get(parent).ok_or_else(|| ConfigurationError::UnknownParent {
            class: current.name.clone(),
            parent: parent.clone(),
        })?;
    }
}

/// Frozen, inheritance-resolved class configurations.
#[derive(Debug)]
pub struct Registry {
    classes: HashMap<String, Arc<ResolvedClass>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a class; unknown names are a configuration error.
    pub fn class(&self, name: &str) -> ConfigResult<Arc<ResolvedClass>> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownClass(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
