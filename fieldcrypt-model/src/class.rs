//! Entity class declarations and their inheritance-resolved form.

use crate::config::ReadPolicy;
use crate::error::{ConfigResult, ConfigurationError};
use crate::schema::{FieldDescriptor, FieldSpec, is_ciphertext_column};
use fieldcrypt_crypto::{CryptoError, FieldEncryptor, KeyedEncryptor};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Class-definition-time declarations for one entity class.
///
/// Nothing is validated until [`RegistryBuilder::build`](crate::RegistryBuilder::build);
/// every method here is infallible so declarations read top to bottom.
pub struct ClassBuilder {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) key: Option<Result<Arc<dyn FieldEncryptor>, CryptoError>>,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) columns: Vec<String>,
    pub(crate) table: Option<String>,
    pub(crate) policy: Option<ReadPolicy>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            key: None,
            fields: Vec::new(),
            columns: Vec::new(),
            table: None,
            policy: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Makes this class a subclass of `parent`.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declares the key from raw material. A later call replaces the key.
    pub fn declare_key(mut self, material: &str) -> Self {
        let encryptor = KeyedEncryptor::from_material(material)
            .map(|e| Arc::new(e) as Arc<dyn FieldEncryptor>);
        self.key = Some(encryptor);
        self
    }

    /// Installs an already-built encryptor. A later call replaces it.
    pub fn declare_cipher(mut self, encryptor: Arc<dyn FieldEncryptor>) -> Self {
        self.key = Some(Ok(encryptor));
        self
    }

    /// Declares encrypted fields. Bare names read back as strings;
    /// `(name, ScalarType)` pairs pick the type. Repeated calls append.
    pub fn declare_fields<I, F>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldSpec>,
    {
        self.fields.extend(specs.into_iter().map(Into::into));
        self
    }

    /// Declares plain (unencrypted) columns of the backing table.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Overrides the backing table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Overrides the registry-wide read policy for this class and its
    /// descendants.
    pub fn read_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Validates this class's own declarations.
    pub(crate) fn into_decl(self) -> ConfigResult<ClassDecl> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName(self.name));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            if spec.name.trim().is_empty() {
                return Err(ConfigurationError::EmptyName(self.name.clone()));
            }
            if is_ciphertext_column(&spec.name) {
                return Err(ConfigurationError::ReservedFieldName {
                    class: self.name.clone(),
                    field: spec.name.clone(),
                });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigurationError::DuplicateField {
                    class: self.name.clone(),
                    field: spec.name.clone(),
                });
            }
            fields.push(spec.descriptor());
        }

        let key = match self.key {
            Some(Ok(encryptor)) => Some(encryptor),
            Some(Err(source)) => {
                return Err(ConfigurationError::InvalidKey {
                    class: self.name,
                    source,
                });
            }
            None => None,
        };

        Ok(ClassDecl {
            name: self.name,
            parent: self.parent,
            key,
            fields,
            columns: self.columns,
            table: self.table,
            policy: self.policy,
        })
    }
}

/// A class's own validated declarations, before inheritance is applied.
pub(crate) struct ClassDecl {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) key: Option<Arc<dyn FieldEncryptor>>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) columns: Vec<String>,
    pub(crate) table: Option<String>,
    pub(crate) policy: Option<ReadPolicy>,
}

/// One entry of a class's accessor table: where a field's state lives on a
/// record and how it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessor<'c> {
    pub index: usize,
    pub descriptor: &'c FieldDescriptor,
}

/// The effective configuration of one entity class.
///
/// Every value is taken from the nearest class in the lineage (self first)
/// that declares a non-empty one. Levels are never merged: a subclass with its
/// own fields does not see its parent's.
pub struct ResolvedClass {
    name: String,
    lineage: Vec<String>,
    table: String,
    key: Option<Arc<dyn FieldEncryptor>>,
    fields: Vec<FieldDescriptor>,
    fields_from: Option<String>,
    accessors: HashMap<String, usize>,
    columns: Vec<String>,
    policy: ReadPolicy,
}

impl ResolvedClass {
    /// Resolves `chain[0]` against its ancestors, nearest first.
    pub(crate) fn resolve(chain: &[&ClassDecl], default_policy: ReadPolicy) -> Self {
        let own = chain[0];
        let nearest_fields = chain.iter().find(|c| !c.fields.is_empty());
        let fields = nearest_fields.map(|c| c.fields.clone()).unwrap_or_default();
        let accessors = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();

        let root = chain[chain.len() - 1];
        Self {
            name: own.name.clone(),
            lineage: chain.iter().map(|c| c.name.clone()).collect(),
            table: chain
                .iter()
                .find_map(|c| c.table.clone())
                .unwrap_or_else(|| root.name.clone()),
            key: chain.iter().find_map(|c| c.key.clone()),
            fields_from: nearest_fields.map(|c| c.name.clone()),
            fields,
            accessors,
            columns: chain
                .iter()
                .find(|c| !c.columns.is_empty())
                .map(|c| c.columns.clone())
                .unwrap_or_default(),
            policy: chain.iter().find_map(|c| c.policy).unwrap_or(default_policy),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// This class followed by its ancestors, nearest first.
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Whether this class is `name` or descends from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage.iter().any(|c| c == name)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Effective encrypted fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The class whose declaration supplied [`fields`](Self::fields).
    pub fn fields_declared_by(&self) -> Option<&str> {
        self.fields_from.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Position of a field in [`fields`](Self::fields); stable for the life
    /// of the registry.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.accessors.get(name).copied()
    }

    /// Accessor table entry for a field.
    pub fn accessor(&self, name: &str) -> Option<Accessor<'_>> {
        self.index_of(name).map(|index| Accessor {
            index,
            descriptor: &self.fields[index],
        })
    }

    /// Plain columns of the backing table.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.policy
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// The effective encryptor, or a loud error when none resolves.
    pub fn key(&self) -> ConfigResult<&Arc<dyn FieldEncryptor>> {
        self.key.as_ref().ok_or_else(|| ConfigurationError::MissingKey {
            class: self.name.clone(),
        })
    }
}

impl fmt::Debug for ResolvedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedClass")
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .field("table", &self.table)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("fields", &self.fields)
            .field("columns", &self.columns)
            .field("policy", &self.policy)
            .finish()
    }
}
