use fieldcrypt_types::RecordId;

/// One stored record: ordered columns plus identity.
///
/// Column values are nullable strings. Reading a column that does not exist
/// behaves like reading NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    id: Option<RecordId>,
    columns: Vec<(String, Option<String>)>,
    persisted: bool,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new, unsaved row with every named column NULL.
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            columns: names.into_iter().map(|n| (n.into(), None)).collect(),
            persisted: false,
        }
    }

    pub(crate) fn from_stored(id: RecordId, columns: Vec<(String, Option<String>)>) -> Self {
        Self {
            id: Some(id),
            columns,
            persisted: true,
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Whether this row has been written to storage.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn read_column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Sets a column, appending it if the row does not have it yet.
    pub fn write_column(&mut self, name: &str, value: Option<String>) {
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((name.to_string(), value)),
        }
    }

    /// Columns in storage order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub(crate) fn stored_columns(&self) -> Vec<(String, Option<String>)> {
        self.columns.clone()
    }

    pub(crate) fn mark_persisted(&mut self, id: RecordId) {
        self.id = Some(id);
        self.persisted = true;
    }

    pub(crate) fn replace_columns(&mut self, columns: Vec<(String, Option<String>)>) {
        self.columns = columns;
    }
}
