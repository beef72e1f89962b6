//! In-memory record store backing tests and demos.
//!
//! Tables hold an ordered schema and records in insertion order. Opaque
//! keys are minted as 32-hex-char simple UUIDs on insert. A lookup counter
//! lets tests assert that an operation never reached the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::traits::{Record, RecordStore, StoreError};

/// Implicit unique-key field present on every table, always first in the
/// schema.
pub const SYS_ID_FIELD: &str = "sys_id";

/// Auto-stamped creation timestamp, filled on insert when the schema
/// declares it and the draft left it unset.
const CREATED_ON_FIELD: &str = "sys_created_on";

#[derive(Debug, Clone, Default)]
struct Cell {
    raw: Option<String>,
    display: Option<String>,
}

/// Record snapshot handed out by [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoredRecord {
    sys_id: String,
    display_field: String,
    fields: Vec<String>,
    cells: HashMap<String, Cell>,
}

impl Record for StoredRecord {
    fn sys_id(&self) -> &str {
        &self.sys_id
    }

    fn display_value(&self) -> String {
        self.value(self.display_field.as_str()).unwrap_or_default()
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn value(&self, field: &str) -> Option<String> {
        if field == SYS_ID_FIELD {
            return Some(self.sys_id.clone());
        }
        if !self.fields.iter().any(|f| f == field) {
            return None;
        }
        self.cells.get(field).and_then(|cell| cell.raw.clone())
    }

    fn display(&self, field: &str) -> Option<String> {
        if field == SYS_ID_FIELD {
            return Some(self.sys_id.clone());
        }
        if !self.fields.iter().any(|f| f == field) {
            return None;
        }
        let cell = self.cells.get(field);
        Some(
            cell.and_then(|c| c.display.clone())
                .or_else(|| cell.and_then(|c| c.raw.clone()))
                .unwrap_or_default(),
        )
    }
}

/// Unsaved record contents: raw values plus optional display overrides.
#[derive(Debug, Default)]
pub struct RecordDraft {
    cells: IndexMap<String, Cell>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value; the display value defaults to it.
    pub fn set(mut self, field: &str, raw: &str) -> Self {
        self.cells.insert(
            field.to_string(),
            Cell {
                raw: Some(raw.to_string()),
                display: None,
            },
        );
        self
    }

    /// Set a raw value with a distinct display rendering.
    pub fn set_with_display(mut self, field: &str, raw: &str, display: &str) -> Self {
        self.cells.insert(
            field.to_string(),
            Cell {
                raw: Some(raw.to_string()),
                display: Some(display.to_string()),
            },
        );
        self
    }

    /// Explicitly store null for a field.
    pub fn set_null(mut self, field: &str) -> Self {
        self.cells.insert(field.to_string(), Cell::default());
        self
    }
}

#[derive(Debug)]
struct Table {
    display_field: String,
    fields: Vec<String>,
    records: Vec<StoredRecord>,
}

/// Map-backed [`RecordStore`] with insertion-order iteration.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: IndexMap<String, Table>,
    lookups: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) a table. The `sys_id` field is implicit and
    /// always leads the schema; `display_field` names the field whose
    /// value serves as the record's overall display string.
    pub fn create_table(&mut self, name: &str, display_field: &str, fields: &[&str]) {
        let mut schema = vec![SYS_ID_FIELD.to_string()];
        for field in fields {
            if *field != SYS_ID_FIELD {
                schema.push((*field).to_string());
            }
        }
        debug!(table = name, fields = schema.len(), "table declared");
        self.tables.insert(
            name.to_string(),
            Table {
                display_field: display_field.to_string(),
                fields: schema,
                records: Vec::new(),
            },
        );
    }

    /// Append a record, minting a fresh opaque key. Fields outside the
    /// schema are rejected; `sys_id` is assigned by the store and cannot
    /// be supplied.
    pub fn insert(&mut self, table: &str, draft: RecordDraft) -> Result<String, StoreError> {
        let entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError(format!("unknown table '{table}'")))?;

        for name in draft.cells.keys() {
            if name == SYS_ID_FIELD {
                return Err(StoreError("field 'sys_id' is assigned by the store".into()));
            }
            if !entry.fields.iter().any(|f| f == name) {
                return Err(StoreError(format!(
                    "unknown field '{name}' on table '{table}'"
                )));
            }
        }

        let sys_id = Uuid::new_v4().simple().to_string();
        let mut cells: HashMap<String, Cell> = draft.cells.into_iter().collect();

        if entry.fields.iter().any(|f| f == CREATED_ON_FIELD)
            && !cells.contains_key(CREATED_ON_FIELD)
        {
            let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
            cells.insert(
                CREATED_ON_FIELD.to_string(),
                Cell {
                    raw: Some(stamp),
                    display: None,
                },
            );
        }

        entry.records.push(StoredRecord {
            sys_id: sys_id.clone(),
            display_field: entry.display_field.clone(),
            fields: entry.fields.clone(),
            cells,
        });
        debug!(table, sys_id = %sys_id, "record inserted");
        Ok(sys_id)
    }

    /// Number of single-record fetches served so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl RecordStore for MemoryStore {
    type Rec = StoredRecord;

    fn is_valid_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn is_valid_field(&self, table: &str, field: &str) -> bool {
        self.tables
            .get(table)
            .map(|t| t.fields.iter().any(|f| f == field))
            .unwrap_or(false)
    }

    fn list_fields(&self, table: &str) -> Vec<String> {
        self.tables
            .get(table)
            .map(|t| t.fields.clone())
            .unwrap_or_default()
    }

    fn get(&self, table: &str, sys_id: &str) -> Result<Option<StoredRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let Some(entry) = self.tables.get(table) else {
            return Ok(None);
        };
        Ok(entry.records.iter().find(|r| r.sys_id == sys_id).cloned())
    }

    fn get_by_field(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let Some(entry) = self.tables.get(table) else {
            return Ok(None);
        };
        Ok(entry
            .records
            .iter()
            .find(|r| r.value(field).as_deref() == Some(value))
            .cloned())
    }

    fn query(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let Some(entry) = self.tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .records
            .iter()
            .filter(|r| r.value(field).as_deref() == Some(value))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.create_table(
            "incident",
            "number",
            &["number", "short_description", "sys_created_on"],
        );
        store
    }

    #[test]
    fn schema_keeps_declaration_order_with_sys_id_first() {
        let store = incident_store();
        assert!(store.is_valid_table("incident"));
        assert!(!store.is_valid_table("problem"));
        assert_eq!(
            store.list_fields("incident"),
            vec!["sys_id", "number", "short_description", "sys_created_on"]
        );
        assert!(store.is_valid_field("incident", "number"));
        assert!(!store.is_valid_field("incident", "priority"));
        assert!(store.list_fields("problem").is_empty());
    }

    #[test]
    fn insert_mints_32_hex_keys() {
        let mut store = incident_store();
        let sys_id = store
            .insert("incident", RecordDraft::new().set("number", "INC0010001"))
            .unwrap();
        assert_eq!(sys_id.len(), 32);
        assert!(sys_id.chars().all(|c| c.is_ascii_hexdigit()));

        let rec = store.get("incident", &sys_id).unwrap().unwrap();
        assert_eq!(rec.sys_id(), sys_id);
        assert_eq!(rec.value("sys_id").as_deref(), Some(sys_id.as_str()));
    }

    #[test]
    fn display_defaults_to_raw_and_respects_overrides() {
        let mut store = MemoryStore::new();
        store.create_table("sys_user", "name", &["user_name", "name", "department"]);
        let sys_id = store
            .insert(
                "sys_user",
                RecordDraft::new()
                    .set("user_name", "abel.tuter")
                    .set("name", "Abel Tuter")
                    .set_with_display("department", "dpt001", "Customer Support"),
            )
            .unwrap();

        let rec = store.get("sys_user", &sys_id).unwrap().unwrap();
        assert_eq!(rec.display_value(), "Abel Tuter");
        assert_eq!(rec.display("user_name").as_deref(), Some("abel.tuter"));
        assert_eq!(rec.value("department").as_deref(), Some("dpt001"));
        assert_eq!(rec.display("department").as_deref(), Some("Customer Support"));
        assert_eq!(rec.display("manager"), None);
    }

    #[test]
    fn created_on_is_stamped_only_when_declared_and_unset() {
        let mut store = incident_store();
        let auto = store
            .insert("incident", RecordDraft::new().set("number", "INC0010002"))
            .unwrap();
        let rec = store.get("incident", &auto).unwrap().unwrap();
        assert!(!rec.value("sys_created_on").unwrap_or_default().is_empty());

        let manual = store
            .insert(
                "incident",
                RecordDraft::new()
                    .set("number", "INC0010003")
                    .set("sys_created_on", "2024-01-01 00:00:00"),
            )
            .unwrap();
        let rec = store.get("incident", &manual).unwrap().unwrap();
        assert_eq!(
            rec.value("sys_created_on").as_deref(),
            Some("2024-01-01 00:00:00")
        );

        let mut bare = MemoryStore::new();
        bare.create_table("task", "number", &["number"]);
        let sys_id = bare
            .insert("task", RecordDraft::new().set("number", "TASK001"))
            .unwrap();
        let rec = bare.get("task", &sys_id).unwrap().unwrap();
        assert_eq!(rec.value("sys_created_on"), None);
    }

    #[test]
    fn rejects_unknown_fields_and_supplied_sys_id() {
        let mut store = incident_store();
        assert!(store
            .insert("incident", RecordDraft::new().set("priority", "1"))
            .is_err());
        assert!(store
            .insert("incident", RecordDraft::new().set("sys_id", "x"))
            .is_err());
        assert!(store.insert("problem", RecordDraft::new()).is_err());
    }

    #[test]
    fn query_follows_insertion_order() {
        let mut store = MemoryStore::new();
        store.create_table("incident", "number", &["number", "assignment_group"]);
        let first = store
            .insert(
                "incident",
                RecordDraft::new()
                    .set("number", "INC0010004")
                    .set("assignment_group", "network"),
            )
            .unwrap();
        let second = store
            .insert(
                "incident",
                RecordDraft::new()
                    .set("number", "INC0010005")
                    .set("assignment_group", "network"),
            )
            .unwrap();
        store
            .insert(
                "incident",
                RecordDraft::new()
                    .set("number", "INC0010006")
                    .set("assignment_group", "storage"),
            )
            .unwrap();

        let hits = store.query("incident", "assignment_group", "network").unwrap();
        let ids: Vec<&str> = hits.iter().map(|r| r.sys_id()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);

        assert!(store.query("incident", "assignment_group", "facilities").unwrap().is_empty());
        assert!(store.query("problem", "number", "x").unwrap().is_empty());
    }

    #[test]
    fn null_cells_never_match_and_read_as_none() {
        let mut store = MemoryStore::new();
        store.create_table("incident", "number", &["number", "short_description"]);
        let sys_id = store
            .insert(
                "incident",
                RecordDraft::new()
                    .set("number", "INC0010007")
                    .set_null("short_description"),
            )
            .unwrap();

        let rec = store.get("incident", &sys_id).unwrap().unwrap();
        assert_eq!(rec.value("short_description"), None);
        assert_eq!(rec.display("short_description").as_deref(), Some(""));
        assert!(store
            .query("incident", "short_description", "")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn lookup_counter_tracks_single_record_fetches() {
        let mut store = incident_store();
        let sys_id = store
            .insert("incident", RecordDraft::new().set("number", "INC0010008"))
            .unwrap();
        let base = store.lookup_count();

        store.get("incident", &sys_id).unwrap();
        store.get_by_field("incident", "number", "INC0010008").unwrap();
        assert_eq!(store.lookup_count(), base + 2);

        store.query("incident", "number", "INC0010008").unwrap();
        assert_eq!(store.lookup_count(), base + 2);
    }
}
