//! Per-field accessor handle.

use crate::error::RecordResult;
use crate::record::EncryptedRecord;
use crate::state::FieldState;
use fieldcrypt_model::{FieldDescriptor, Value};

/// Borrowed view of one encrypted field on a record.
///
/// Obtained from [`EncryptedRecord::field`]; the name has already been
/// resolved, so operations here never fail with `UnknownField`.
pub struct Field<'r> {
    record: &'r mut EncryptedRecord,
    index: usize,
}

impl<'r> Field<'r> {
    pub(crate) fn new(record: &'r mut EncryptedRecord, index: usize) -> Self {
        Self { record, index }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.record.class().fields()[self.index]
    }

    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    pub fn get(&mut self) -> RecordResult<Option<Value>> {
        self.record.get_at(self.index)
    }

    pub fn set(&mut self, value: impl Into<Value>) {
        self.record
            .assign_at(self.index, Some(value.into().to_plaintext()));
    }

    pub fn set_null(&mut self) {
        self.record.assign_at(self.index, None);
    }

    pub fn before_type_cast(&mut self) -> RecordResult<Option<String>> {
        self.record.read(self.index)
    }

    pub fn was(&mut self) -> RecordResult<Option<String>> {
        self.record.was_at(self.index)
    }

    pub fn is_changed(&self) -> bool {
        self.record.is_changed_at(self.index)
    }

    pub fn change(&mut self) -> RecordResult<Option<(Option<String>, Option<String>)>> {
        self.record.change_at(self.index)
    }

    pub fn state(&self) -> &FieldState {
        self.record.state_at(self.index)
    }
}
