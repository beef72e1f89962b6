//! Collaborator interface over the external record store.
//!
//! The accessor consumes tables generically: schema introspection reports
//! an ordered field list at runtime, and per-record access goes through
//! string-keyed raw/display getters. Nothing here assumes a compile-time
//! table shape.

use thiserror::Error;

/// Unexpected failure inside the record store (backend fault, corruption).
/// The accessor converts these to empty results at its boundary.
#[derive(Debug, Error)]
#[error("record store failure: {0}")]
pub struct StoreError(pub String);

/// One fetched record.
pub trait Record {
    /// Opaque unique key. Never empty.
    fn sys_id(&self) -> &str;

    /// Overall display string for the record (its label or number).
    fn display_value(&self) -> String;

    /// Defined field names in schema order, unique-key field included.
    fn field_names(&self) -> Vec<String>;

    /// Raw value of a field. `None` when the field is undefined on the
    /// table or holds null.
    fn value(&self, field: &str) -> Option<String>;

    /// Display value of a field. `None` only when the field is undefined.
    fn display(&self, field: &str) -> Option<String>;
}

/// Synchronous query interface to a tabular record store.
pub trait RecordStore {
    type Rec: Record;

    /// Whether `table` exists and is queryable.
    fn is_valid_table(&self, table: &str) -> bool;

    /// Whether `field` is defined on `table`.
    fn is_valid_field(&self, table: &str, field: &str) -> bool;

    /// Defined field names of `table` in schema order; empty for an
    /// unknown table.
    fn list_fields(&self, table: &str) -> Vec<String>;

    /// Fetch a single record by opaque key.
    fn get(&self, table: &str, sys_id: &str) -> Result<Option<Self::Rec>, StoreError>;

    /// Fetch the first record whose `field` equals `value`.
    fn get_by_field(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Self::Rec>, StoreError>;

    /// All records whose `field` equals `value`, in the store's natural
    /// iteration order.
    fn query(&self, table: &str, field: &str, value: &str)
        -> Result<Vec<Self::Rec>, StoreError>;
}
