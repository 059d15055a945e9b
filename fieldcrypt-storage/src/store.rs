//! In-memory tables of rows.

use crate::error::{StorageError, StorageResult};
use crate::lifecycle::Lifecycle;
use crate::row::Row;
use fieldcrypt_types::RecordId;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

type Table = HashMap<RecordId, Vec<(String, Option<String>)>>;

/// Thread-safe in-memory row store.
///
/// Rows are stored exactly as the model hands them over; whatever the model
/// wrote into a column (ciphertext included) is what `load` returns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Persists a model.
    ///
    /// Runs `before_save` once, then inserts (assigning a new id) or updates
    /// the row, marks it persisted, clears dirty tracking and runs
    /// `after_save`. A hook error leaves storage untouched.
    pub fn save<M: Lifecycle + ?Sized>(&self, model: &mut M) -> StorageResult<RecordId> {
        model.before_save().map_err(StorageError::Hook)?;

        let table = model.table().to_string();
        let inserting = !model.row().is_persisted();
        let id = model.row().id().unwrap_or_else(RecordId::new);
        let columns = model.row().stored_columns();

        {
            let mut tables = self.write()?;
            let rows = tables.entry(table.clone()).or_default();
            if !inserting && !rows.contains_key(&id) {
                return Err(StorageError::NotFound { table, id });
            }
            rows.insert(id, columns);
        }

        model.row_mut().mark_persisted(id);
        model.dirty_mut().clear();
        model.after_save();

        if inserting {
            debug!("Inserted {} into {}", id, table);
        } else {
            debug!("Updated {} in {}", id, table);
        }
        Ok(id)
    }

    /// Fetches a stored row.
    pub fn load(&self, table: &str, id: RecordId) -> StorageResult<Row> {
        let tables = self.read()?;
        tables
            .get(table)
            .and_then(|rows| rows.get(&id))
            .map(|columns| Row::from_stored(id, columns.clone()))
            .ok_or_else(|| StorageError::NotFound {
                table: table.to_string(),
                id,
            })
    }

    /// Stored columns of a row, for inspection.
    pub fn raw_row(&self, table: &str, id: RecordId) -> StorageResult<Vec<(String, Option<String>)>> {
        self.load(table, id).map(|row| row.stored_columns())
    }

    /// Re-reads a persisted model's row from storage, discarding unsaved
    /// column writes and dirty state, then runs `after_reload`.
    pub fn reload<M: Lifecycle + ?Sized>(&self, model: &mut M) -> StorageResult<()> {
        let id = match model.row().id() {
            Some(id) if model.row().is_persisted() => id,
            _ => return Err(StorageError::NotPersisted(model.table().to_string())),
        };

        let fresh = self.load(model.table(), id)?;
        model.row_mut().replace_columns(fresh.stored_columns());
        model.dirty_mut().clear();
        model.after_reload();

        debug!("Reloaded {} from {}", id, model.table());
        Ok(())
    }

    /// Writes one stored column directly, bypassing any model.
    pub fn update_column(
        &self,
        table: &str,
        id: RecordId,
        column: &str,
        value: Option<String>,
    ) -> StorageResult<()> {
        let mut tables = self.write()?;
        let columns = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or_else(|| StorageError::NotFound {
                table: table.to_string(),
                id,
            })?;

        match columns.iter_mut().find(|(n, _)| n == column) {
            Some((_, slot)) => *slot = value,
            None => columns.push((column.to_string(), value)),
        }
        Ok(())
    }

    /// Removes a row. Returns whether it existed.
    pub fn delete(&self, table: &str, id: RecordId) -> StorageResult<bool> {
        let mut tables = self.write()?;
        Ok(tables
            .get_mut(table)
            .is_some_and(|rows| rows.remove(&id).is_some()))
    }

    /// Number of rows in a table.
    pub fn count(&self, table: &str) -> StorageResult<usize> {
        Ok(self.read()?.get(table).map_or(0, HashMap::len))
    }
}
