//! The encrypted record: field state machine, accessors and save-path
//! encryption.

use crate::accessor::Field;
use crate::error::{RecordError, RecordResult};
use crate::state::{FieldState, StateTable};
use fieldcrypt_model::{CoercionFailure, DecryptFailure, ResolvedClass, Value};
use fieldcrypt_storage::{DirtyTracker, HookError, Lifecycle, MemoryStore, Row, StorageError};
use fieldcrypt_types::RecordId;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A stored entity with transparently encrypted fields.
///
/// Owned by a single unit of work; all mutation goes through `&mut self`.
pub struct EncryptedRecord {
    class: Arc<ResolvedClass>,
    row: Row,
    dirty: DirtyTracker,
    states: StateTable,
    // Set when the dirty tracker's previous value for a field is the stored
    // ciphertext rather than plaintext.
    sealed_previous: Vec<bool>,
}

impl EncryptedRecord {
    /// A new, unsaved record. Every field starts pending with the column
    /// default, so the first save encrypts all of them.
    pub fn new(class: Arc<ResolvedClass>) -> Self {
        let columns = class
            .columns()
            .iter()
            .map(String::as_str)
            .chain(class.fields().iter().map(|f| f.column()));
        let row = Row::with_columns(columns);
        let mut record = Self::from_row(class, row);
        for index in 0..record.states.len() {
            let default = record.column_value(index);
            record.states.mark_pending(index, default);
        }
        record
    }

    /// Wraps an existing row. Fields start `Unloaded`.
    pub fn from_row(class: Arc<ResolvedClass>, row: Row) -> Self {
        let len = class.fields().len();
        Self {
            class,
            row,
            dirty: DirtyTracker::new(),
            states: StateTable::unloaded(len),
            sealed_previous: vec![false; len],
        }
    }

    /// Loads a stored record of `class`.
    pub fn find(store: &MemoryStore, class: Arc<ResolvedClass>, id: RecordId) -> RecordResult<Self> {
        let row = store.load(class.table(), id)?;
        Ok(Self::from_row(class, row))
    }

    /// Saves through `store`, encrypting pending fields first.
    pub fn save(&mut self, store: &MemoryStore) -> RecordResult<RecordId> {
        store.save(self).map_err(unwrap_hook_error)
    }

    /// Re-reads the row from `store` and drops every cached plaintext.
    pub fn reload(&mut self, store: &MemoryStore) -> RecordResult<()> {
        store.reload(self).map_err(RecordError::from)
    }

    pub fn class(&self) -> &ResolvedClass {
        &self.class
    }

    pub fn id(&self) -> Option<RecordId> {
        self.row.id()
    }

    pub fn is_persisted(&self) -> bool {
        self.row.is_persisted()
    }

    pub fn is_new_record(&self) -> bool {
        !self.row.is_persisted()
    }

    /// The backing row, ciphertext columns included.
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn field_state(&self, field: &str) -> RecordResult<&FieldState> {
        let index = self.index(field)?;
        Ok(self.states.get(index))
    }

    /// Accessor handle for one encrypted field.
    pub fn field(&mut self, name: &str) -> RecordResult<Field<'_>> {
        let index = self.index(name)?;
        Ok(Field::new(self, index))
    }

    // ── Name-based accessors ─────────────────────────────────────

    /// Typed value of an encrypted field.
    pub fn get(&mut self, field: &str) -> RecordResult<Option<Value>> {
        let index = self.index(field)?;
        self.get_at(index)
    }

    /// Raw plaintext of an encrypted field, without type coercion.
    pub fn before_type_cast(&mut self, field: &str) -> RecordResult<Option<String>> {
        let index = self.index(field)?;
        self.read(index)
    }

    /// Assigns a field. Never calls the cipher.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> RecordResult<()> {
        let index = self.index(field)?;
        self.assign_at(index, Some(value.into().to_plaintext()));
        Ok(())
    }

    /// Assigns an absent value. Never calls the cipher.
    pub fn set_null(&mut self, field: &str) -> RecordResult<()> {
        let index = self.index(field)?;
        self.assign_at(index, None);
        Ok(())
    }

    /// Plaintext before the first unsaved change, or the current plaintext
    /// when the field is unchanged.
    pub fn was(&mut self, field: &str) -> RecordResult<Option<String>> {
        let index = self.index(field)?;
        self.was_at(index)
    }

    pub fn is_changed(&self, field: &str) -> RecordResult<bool> {
        self.index(field)?;
        Ok(self.dirty.is_changed(field))
    }

    /// `(was, now)` plaintext for a changed field.
    pub fn change(&mut self, field: &str) -> RecordResult<Option<(Option<String>, Option<String>)>> {
        let index = self.index(field)?;
        self.change_at(index)
    }

    /// Attributes changed since the last load or save, fields and plain
    /// columns alike.
    pub fn changed(&self) -> Vec<&str> {
        self.dirty.changed()
    }

    // ── Plain columns ────────────────────────────────────────────

    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.row.read_column(column)
    }

    /// Writes a backing column directly.
    ///
    /// Writing a ciphertext column drops that field's cached plaintext.
    pub fn set_attribute(&mut self, column: &str, value: Option<String>) {
        let current = self.row.read_column(column);
        if current != value.as_deref() {
            let previous = current.map(str::to_owned);
            self.dirty.mark_changed(column, previous);
        }
        self.row.write_column(column, value);

        let class = Arc::clone(&self.class);
        if let Some(index) = class.fields().iter().position(|f| f.column() == column) {
            self.states.invalidate(index);
        }
    }

    // ── Save path ────────────────────────────────────────────────

    /// Writes ciphertext for every pending field and marks it loaded.
    /// Returns how many values went through the cipher.
    ///
    /// Called by the `before_save` hook; fields that are not pending are left
    /// alone.
    pub fn encrypt_pending(&mut self) -> RecordResult<usize> {
        if self.is_new_record() {
            for index in 0..self.states.len() {
                if self.states.get(index).is_unloaded() {
                    self.read(index)?;
                }
            }
        }

        let pending: Vec<(usize, Option<String>)> = self
            .states
            .pending()
            .map(|(i, v)| (i, v.map(str::to_owned)))
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let class = Arc::clone(&self.class);
        // NULL stays NULL; only real values need the key. Check it before
        // touching any column.
        if pending.iter().any(|(_, v)| v.is_some()) {
            class.key()?;
        }

        let mut sealed = 0;
        for (index, value) in pending {
            let descriptor = &class.fields()[index];
            let column_value = match value.as_deref() {
                Some(plaintext) => {
                    let ciphertext = class.key()?.encrypt(plaintext).map_err(|source| {
                        RecordError::Encrypt {
                            field: descriptor.name().to_string(),
                            source,
                        }
                    })?;
                    sealed += 1;
                    Some(ciphertext)
                }
                None => None,
            };
            self.row.write_column(descriptor.column(), column_value);
            self.states.mark_loaded(index, value);
        }

        debug!("Encrypted {} field values on {}", sealed, class.name());
        Ok(sealed)
    }

    // ── Index-based operations, shared with `Field` ──────────────

    pub(crate) fn index(&self, field: &str) -> RecordResult<usize> {
        self.class
            .accessor(field)
            .map(|accessor| accessor.index)
            .ok_or_else(|| RecordError::UnknownField {
                class: self.class.name().to_string(),
                field: field.to_string(),
            })
    }

    pub(crate) fn class_handle(&self) -> Arc<ResolvedClass> {
        Arc::clone(&self.class)
    }

    pub(crate) fn field_name(&self, index: usize) -> &str {
        self.class.fields()[index].name()
    }

    pub(crate) fn state_at(&self, index: usize) -> &FieldState {
        self.states.get(index)
    }

    pub(crate) fn get_at(&mut self, index: usize) -> RecordResult<Option<Value>> {
        let Some(raw) = self.read(index)? else {
            return Ok(None);
        };

        let descriptor = &self.class.fields()[index];
        match Value::coerce(&raw, descriptor.scalar_type()) {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.class.read_policy().coercion_failure {
                CoercionFailure::Absent => {
                    debug!("Reading {}.{}: {}", self.class.name(), descriptor.name(), source);
                    Ok(None)
                }
                CoercionFailure::Raise => Err(RecordError::Coercion {
                    field: descriptor.name().to_string(),
                    source,
                }),
            },
        }
    }

    /// Cached plaintext, or decrypt-on-read.
    pub(crate) fn read(&mut self, index: usize) -> RecordResult<Option<String>> {
        if let Some(cached) = self.states.cached(index) {
            return Ok(cached.map(str::to_owned));
        }

        let raw = self.column_value(index);
        if self.is_new_record() {
            // Never saved: the column still holds its plaintext default.
            self.states.mark_pending(index, raw.clone());
            return Ok(raw);
        }

        let Some(ciphertext) = raw else {
            self.states.mark_loaded(index, None);
            return Ok(None);
        };

        let class = Arc::clone(&self.class);
        match class.key()?.decrypt(&ciphertext) {
            Ok(plaintext) => {
                self.states.mark_loaded(index, Some(plaintext.clone()));
                Ok(Some(plaintext))
            }
            Err(source) => {
                let field = class.fields()[index].name();
                warn!("Failed to decrypt {}.{}: {}", class.name(), field, source);
                match class.read_policy().decrypt_failure {
                    DecryptFailure::Absent => {
                        self.states.mark_loaded(index, None);
                        Ok(None)
                    }
                    DecryptFailure::Retry => Ok(None),
                    DecryptFailure::Raise => Err(RecordError::Decrypt {
                        field: field.to_string(),
                        source,
                    }),
                }
            }
        }
    }

    pub(crate) fn assign_at(&mut self, index: usize, value: Option<String>) {
        let class = Arc::clone(&self.class);
        let name = class.fields()[index].name();

        // Known current plaintext: cached, or the raw default of a new record.
        let current = match self.states.cached(index) {
            Some(cached) => Some(cached.map(str::to_owned)),
            None if self.is_new_record() => Some(self.column_value(index)),
            None => None,
        };

        match current {
            Some(current) => {
                if current != value {
                    self.dirty.mark_changed(name, current);
                }
            }
            None => {
                // Comparing would mean decrypting; remember the ciphertext.
                if !self.dirty.is_changed(name) {
                    let ciphertext = self.column_value(index);
                    self.dirty.mark_changed(name, ciphertext);
                    self.sealed_previous[index] = true;
                }
            }
        }

        self.states.mark_pending(index, value);
    }

    pub(crate) fn was_at(&mut self, index: usize) -> RecordResult<Option<String>> {
        let class = Arc::clone(&self.class);
        let field = class.fields()[index].name();
        let Some(previous) = self.dirty.was(field).map(|p| p.map(str::to_owned)) else {
            return self.read(index);
        };

        if !self.sealed_previous[index] {
            return Ok(previous);
        }
        let Some(ciphertext) = previous else {
            return Ok(None);
        };

        match class.key()?.decrypt(&ciphertext) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(source) => {
                warn!("Failed to decrypt previous {}.{}: {}", class.name(), field, source);
                match class.read_policy().decrypt_failure {
                    DecryptFailure::Absent | DecryptFailure::Retry => Ok(None),
                    DecryptFailure::Raise => Err(RecordError::Decrypt {
                        field: field.to_string(),
                        source,
                    }),
                }
            }
        }
    }

    pub(crate) fn is_changed_at(&self, index: usize) -> bool {
        self.dirty.is_changed(self.field_name(index))
    }

    pub(crate) fn change_at(
        &mut self,
        index: usize,
    ) -> RecordResult<Option<(Option<String>, Option<String>)>> {
        if !self.is_changed_at(index) {
            return Ok(None);
        }
        let was = self.was_at(index)?;
        let now = self.read(index)?;
        Ok(Some((was, now)))
    }

    fn column_value(&self, index: usize) -> Option<String> {
        let column = self.class.fields()[index].column();
        self.row.read_column(column).map(str::to_owned)
    }
}

/// Recovers a record error that travelled through the store as a hook error.
fn unwrap_hook_error(err: StorageError) -> RecordError {
    match err {
        StorageError::Hook(source) => match source.downcast::<RecordError>() {
            Ok(record_err) => *record_err,
            Err(other) => RecordError::Storage(StorageError::Hook(other)),
        },
        other => RecordError::Storage(other),
    }
}

impl Lifecycle for EncryptedRecord {
    fn table(&self) -> &str {
        self.class.table()
    }

    fn row(&self) -> &Row {
        &self.row
    }

    fn row_mut(&mut self) -> &mut Row {
        &mut self.row
    }

    fn dirty_mut(&mut self) -> &mut DirtyTracker {
        &mut self.dirty
    }

    fn before_save(&mut self) -> Result<(), HookError> {
        self.encrypt_pending()?;
        Ok(())
    }

    fn after_save(&mut self) {
        self.sealed_previous.fill(false);
    }

    fn after_reload(&mut self) {
        self.states.invalidate_all();
        self.sealed_previous.fill(false);
    }
}

impl fmt::Debug for EncryptedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<(&str, &str)> = self
            .class
            .fields()
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let state = match self.states.get(i) {
                    FieldState::Unloaded => "unloaded",
                    FieldState::PlaintextLoaded(_) => "loaded",
                    FieldState::PendingEncryption(_) => "pending",
                };
                (d.name(), state)
            })
            .collect();
        f.debug_struct("EncryptedRecord")
            .field("class", &self.class.name())
            .field("id", &self.row.id())
            .field("persisted", &self.row.is_persisted())
            .field("fields", &states)
            .finish()
    }
}
