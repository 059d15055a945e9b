//! Serialization snapshots that expose plaintext, never ciphertext.

use crate::error::RecordResult;
use crate::record::EncryptedRecord;
use fieldcrypt_model::is_ciphertext_column;
use serde_json::{Map, Value as JsonValue};

impl EncryptedRecord {
    /// Attribute map for serialization.
    ///
    /// Keys come in a fixed order: `id` when assigned, the plain columns in
    /// row order, then every effective encrypted field in declaration order.
    /// No `encrypted_*` column ever appears. Reading fields here decrypts them
    /// under the class's read policy, exactly as `get` would.
    pub fn attributes(&mut self) -> RecordResult<Map<String, JsonValue>> {
        let mut map = Map::new();
        if let Some(id) = self.id() {
            map.insert("id".to_string(), JsonValue::String(id.to_string()));
        }

        let class = self.class_handle();
        for (column, value) in self.row().columns() {
            if is_ciphertext_column(column) || class.index_of(column).is_some() || column == "id" {
                continue;
            }
            let value = value.map_or(JsonValue::Null, |v| JsonValue::String(v.to_string()));
            map.insert(column.to_string(), value);
        }

        for (index, descriptor) in class.fields().iter().enumerate() {
            let value = self
                .get_at(index)?
                .map_or(JsonValue::Null, |v| v.to_json());
            map.insert(descriptor.name().to_string(), value);
        }
        Ok(map)
    }

    /// [`attributes`](Self::attributes) as a JSON object.
    pub fn to_json(&mut self) -> RecordResult<JsonValue> {
        Ok(JsonValue::Object(self.attributes()?))
    }
}
