use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the unique-key field every table carries. The key is surfaced
/// only as the top-level `sys_id` of a [`FlattenedRecord`], never as a
/// regular field entry.
pub const SYS_ID_FIELD: &str = "sys_id";

/// Name of the record-level display string in the serialized shape.
pub const DISPLAY_VALUE_KEY: &str = "display_value";

/// Raw value plus its human-readable rendering for one field.
///
/// `value` is `None` when the store holds null; `display_value` is always a
/// best-effort string and may equal the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Option<String>,
    pub display_value: String,
}

impl FieldValue {
    pub fn new(value: Option<String>, display_value: impl Into<String>) -> Self {
        Self {
            value,
            display_value: display_value.into(),
        }
    }

    /// True when the raw value is null or the empty string. The display
    /// value is deliberately not consulted.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, str::is_empty)
    }
}

/// Immutable field-name-to-value snapshot of one record.
///
/// Serializes flat: the reserved `sys_id` and `display_value` keys sit at
/// the top level as plain strings, followed by each field as a
/// `{"value": ..., "display_value": ...}` pair in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenedRecord {
    pub sys_id: String,
    pub display_value: String,
    #[serde(flatten)]
    fields: IndexMap<String, FieldValue>,
}

impl FlattenedRecord {
    pub fn new(sys_id: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            sys_id: sys_id.into(),
            display_value: display_value.into(),
            fields: IndexMap::new(),
        }
    }

    /// True for the field names that live at the top level of the
    /// serialized shape and must never appear as regular entries.
    pub fn is_reserved(name: &str) -> bool {
        name == SYS_ID_FIELD || name == DISPLAY_VALUE_KEY
    }

    /// Add a field entry. Reserved names are dropped; the record-level
    /// values always win.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if Self::is_reserved(&name) {
            return;
        }
        self.fields.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in insertion (schema) order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
