use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every backing ciphertext column.
pub const CIPHERTEXT_COLUMN_PREFIX: &str = "encrypted_";

/// Name of the column holding the ciphertext of logical field `name`.
pub fn ciphertext_column(name: &str) -> String {
    format!("{CIPHERTEXT_COLUMN_PREFIX}{name}")
}

/// Whether a column name follows the ciphertext naming pattern.
pub fn is_ciphertext_column(column: &str) -> bool {
    column.starts_with(CIPHERTEXT_COLUMN_PREFIX)
}

/// The declared type a field's plaintext is read back as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    #[default]
    String,
    Date,
    DateTime,
    Integer,
    Boolean,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Static metadata for one encrypted logical field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
    column: String,
    scalar_type: ScalarType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        let name = name.into();
        Self {
            column: ciphertext_column(&name),
            name,
            scalar_type,
        }
    }

    /// Logical field name callers read and write.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing column holding the ciphertext.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }
}

/// One entry of a `declare_fields` call: a bare name (read as a string) or a
/// name with an explicit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub scalar_type: ScalarType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
        }
    }

    pub(crate) fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor::new(self.name.clone(), self.scalar_type)
    }
}

impl From<&str> for FieldSpec {
    fn from(name: &str) -> Self {
        Self::new(name, ScalarType::String)
    }
}

impl From<String> for FieldSpec {
    fn from(name: String) -> Self {
        Self::new(name, ScalarType::String)
    }
}

impl From<(&str, ScalarType)> for FieldSpec {
    fn from((name, scalar_type): (&str, ScalarType)) -> Self {
        Self::new(name, scalar_type)
    }
}

impl From<(String, ScalarType)> for FieldSpec {
    fn from((name, scalar_type): (String, ScalarType)) -> Self {
        Self::new(name, scalar_type)
    }
}
