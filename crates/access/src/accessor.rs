use serde::Serialize;
use tracing::{debug, error, info, warn};

use recview_core::{AccessConfig, FieldValue, FlattenedRecord};
use recview_store::{Record, RecordStore};

use crate::error::AccessError;

/// Fixed table/field pair for the user-interaction convenience lookup.
const INTERACTION_TABLE: &str = "interaction";
const INTERACTION_USER_FIELD: &str = "opened_for";
const USER_TABLE: &str = "sys_user";
const USER_NAME_FIELD: &str = "user_name";

const EMPTY_OBJECT: &str = "{}";
const EMPTY_LIST: &str = "[]";

/// Read-only façade over a [`RecordStore`].
///
/// Resolves identifiers (opaque key vs. business key, by length), flattens
/// records into [`FlattenedRecord`] snapshots, and finds records that
/// reference a given target. All operations are synchronous and
/// request-scoped; the accessor holds no mutable state, so one instance
/// may serve concurrent callers when the store allows it.
pub struct RecordAccessor<S> {
    store: S,
    config: AccessConfig,
}

impl<S: RecordStore> RecordAccessor<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AccessConfig::default())
    }

    pub fn with_config(store: S, config: AccessConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Field flattening ────────────────────────────────────────

    /// Flatten every schema field of the resolved record. With
    /// `exclude_empty`, fields whose raw value is null or the empty string
    /// are omitted entirely. `None` on any failure.
    pub fn get_fields(
        &self,
        table: &str,
        identifier: &str,
        exclude_empty: bool,
    ) -> Option<FlattenedRecord> {
        match self.try_get_fields(table, identifier, exclude_empty) {
            Ok(record) => Some(record),
            Err(err) => {
                log_failure(&err);
                None
            }
        }
    }

    /// [`get_fields`](Self::get_fields) with empty fields excluded.
    pub fn get_populated_fields(&self, table: &str, identifier: &str) -> Option<FlattenedRecord> {
        self.get_fields(table, identifier, true)
    }

    /// Raw value of the well-known short-text field
    /// (`short_description` by default). Checks the field exists on the
    /// table before resolving the record; `None` on any failure.
    pub fn get_short_description(&self, table: &str, identifier: &str) -> Option<String> {
        match self.try_get_short_description(table, identifier) {
            Ok(text) => Some(text),
            Err(err) => {
                log_failure(&err);
                None
            }
        }
    }

    // ── Reference lookups ───────────────────────────────────────

    /// All records in `table` whose `reference_field` holds the target's
    /// opaque key, in the store's natural order. A non-opaque `target`
    /// requires `target_table` to resolve the business key first; a failed
    /// target resolution short-circuits to the empty sequence.
    pub fn find_referencing(
        &self,
        table: &str,
        reference_field: &str,
        target: &str,
        target_table: Option<&str>,
        exclude_empty: bool,
    ) -> Vec<FlattenedRecord> {
        match self.try_find_referencing(table, reference_field, target, target_table, exclude_empty)
        {
            Ok(records) => records,
            Err(err) => {
                log_failure(&err);
                Vec::new()
            }
        }
    }

    /// Interaction records opened for the given user. The user is
    /// identified by opaque key or by user name.
    pub fn find_user_interactions(&self, user: &str, exclude_empty: bool) -> Vec<FlattenedRecord> {
        match self.try_find_user_interactions(user, exclude_empty) {
            Ok(records) => records,
            Err(err) => {
                log_failure(&err);
                Vec::new()
            }
        }
    }

    // ── Textual variants ────────────────────────────────────────

    /// [`get_fields`](Self::get_fields) serialized to JSON; `"{}"` when
    /// absent or unserializable.
    pub fn get_fields_as_text(&self, table: &str, identifier: &str, exclude_empty: bool) -> String {
        match self.get_fields(table, identifier, exclude_empty) {
            Some(record) => to_text(&record, EMPTY_OBJECT),
            None => EMPTY_OBJECT.to_string(),
        }
    }

    /// [`get_populated_fields`](Self::get_populated_fields) serialized to
    /// JSON; `"{}"` when absent or unserializable.
    pub fn get_populated_fields_as_text(&self, table: &str, identifier: &str) -> String {
        self.get_fields_as_text(table, identifier, true)
    }

    /// [`find_referencing`](Self::find_referencing) serialized to JSON;
    /// `"[]"` when nothing matches or serialization fails.
    pub fn find_referencing_as_text(
        &self,
        table: &str,
        reference_field: &str,
        target: &str,
        target_table: Option<&str>,
        exclude_empty: bool,
    ) -> String {
        let records =
            self.find_referencing(table, reference_field, target, target_table, exclude_empty);
        to_text(&records, EMPTY_LIST)
    }

    /// [`find_user_interactions`](Self::find_user_interactions) serialized
    /// to JSON; `"[]"` when nothing matches or serialization fails.
    pub fn find_user_interactions_as_text(&self, user: &str, exclude_empty: bool) -> String {
        let records = self.find_user_interactions(user, exclude_empty);
        to_text(&records, EMPTY_LIST)
    }

    // ── Resolution ──────────────────────────────────────────────

    /// Resolve an identifier to a record: identifiers of the configured
    /// opaque length go through the key lookup, everything else through
    /// the table's business-key field.
    fn resolve(&self, table: &str, identifier: &str) -> Result<S::Rec, AccessError> {
        validate_name(table, "table")?;
        validate_name(identifier, "identifier")?;
        if !self.store.is_valid_table(table) {
            return Err(AccessError::InvalidTable(table.to_string()));
        }

        let found = if self.config.is_opaque_key(identifier) {
            debug!(table, key = identifier, "looking up record by opaque key");
            self.store.get(table, identifier)?
        } else {
            let field = self.config.business_key_field.as_str();
            debug!(table, field, key = identifier, "looking up record by business key");
            self.store.get_by_field(table, field, identifier)?
        };

        found.ok_or_else(|| AccessError::NotFound {
            table: table.to_string(),
            identifier: identifier.to_string(),
        })
    }

    /// Resolve the target of a reference search to an opaque key. Keys of
    /// the opaque length pass through untouched; business keys need
    /// `target_table`.
    fn resolve_target_key(
        &self,
        target: &str,
        target_table: Option<&str>,
    ) -> Result<String, AccessError> {
        if self.config.is_opaque_key(target) {
            return Ok(target.to_string());
        }
        let table = target_table.ok_or(AccessError::InvalidArgument(
            "target table is required to resolve a business key",
        ))?;
        let record = self.resolve(table, target)?;
        Ok(record.sys_id().to_string())
    }

    fn try_get_fields(
        &self,
        table: &str,
        identifier: &str,
        exclude_empty: bool,
    ) -> Result<FlattenedRecord, AccessError> {
        let record = self.resolve(table, identifier)?;
        Ok(self.flatten(table, &record, exclude_empty))
    }

    fn try_get_short_description(
        &self,
        table: &str,
        identifier: &str,
    ) -> Result<String, AccessError> {
        validate_name(table, "table")?;
        validate_name(identifier, "identifier")?;

        let field = self.config.short_text_field.as_str();
        if !self.store.is_valid_field(table, field) {
            return Err(AccessError::InvalidField {
                table: table.to_string(),
                field: field.to_string(),
            });
        }

        let record = self.resolve(table, identifier)?;
        Ok(record.value(field).unwrap_or_default())
    }

    fn try_find_referencing(
        &self,
        table: &str,
        reference_field: &str,
        target: &str,
        target_table: Option<&str>,
        exclude_empty: bool,
    ) -> Result<Vec<FlattenedRecord>, AccessError> {
        validate_name(table, "table")?;
        validate_name(reference_field, "reference field")?;
        validate_name(target, "target identifier")?;
        if !self.store.is_valid_table(table) {
            return Err(AccessError::InvalidTable(table.to_string()));
        }
        if !self.store.is_valid_field(table, reference_field) {
            return Err(AccessError::InvalidField {
                table: table.to_string(),
                field: reference_field.to_string(),
            });
        }

        let key = self.resolve_target_key(target, target_table)?;
        debug!(table, field = reference_field, key = %key, "querying referencing records");
        let hits = self.store.query(table, reference_field, &key)?;
        Ok(hits
            .iter()
            .map(|record| self.flatten(table, record, exclude_empty))
            .collect())
    }

    fn try_find_user_interactions(
        &self,
        user: &str,
        exclude_empty: bool,
    ) -> Result<Vec<FlattenedRecord>, AccessError> {
        validate_name(user, "user identifier")?;

        let key = if self.config.is_opaque_key(user) {
            user.to_string()
        } else {
            if !self.store.is_valid_table(USER_TABLE) {
                return Err(AccessError::InvalidTable(USER_TABLE.to_string()));
            }
            debug!(table = USER_TABLE, field = USER_NAME_FIELD, key = user, "resolving user by name");
            let record = self
                .store
                .get_by_field(USER_TABLE, USER_NAME_FIELD, user)?
                .ok_or_else(|| AccessError::NotFound {
                    table: USER_TABLE.to_string(),
                    identifier: user.to_string(),
                })?;
            record.sys_id().to_string()
        };

        self.try_find_referencing(
            INTERACTION_TABLE,
            INTERACTION_USER_FIELD,
            &key,
            None,
            exclude_empty,
        )
    }

    /// Build the snapshot: every schema field in order, minus the reserved
    /// top-level keys, each carrying raw plus display value.
    fn flatten(&self, table: &str, record: &S::Rec, exclude_empty: bool) -> FlattenedRecord {
        let mut flat = FlattenedRecord::new(record.sys_id(), record.display_value());
        for field in self.store.list_fields(table) {
            if FlattenedRecord::is_reserved(&field) {
                continue;
            }
            let value = FieldValue::new(
                record.value(&field),
                record.display(&field).unwrap_or_default(),
            );
            if exclude_empty && value.is_blank() {
                continue;
            }
            flat.insert(field, value);
        }
        flat
    }
}

/// One log entry per failed operation, severity by error kind: warn for
/// rejected input, info for missing records, error for store and
/// serialization faults.
fn log_failure(err: &AccessError) {
    match err {
        AccessError::InvalidArgument(_)
        | AccessError::InvalidTable(_)
        | AccessError::InvalidField { .. } => warn!("{err}"),
        AccessError::NotFound { .. } => info!("{err}"),
        AccessError::Serialization(_) | AccessError::Store(_) => error!("{err}"),
    }
}

fn validate_name(value: &str, what: &'static str) -> Result<(), AccessError> {
    if value.trim().is_empty() {
        return Err(AccessError::InvalidArgument(what));
    }
    Ok(())
}

fn to_text<T: Serialize>(value: &T, fallback: &str) -> String {
    match serde_json::to_string(value) {
        Ok(text) => text,
        Err(err) => {
            log_failure(&AccessError::Serialization(err));
            fallback.to_string()
        }
    }
}
