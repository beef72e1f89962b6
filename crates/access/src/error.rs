use thiserror::Error;

use recview_store::StoreError;

/// Internal failure taxonomy for accessor operations.
///
/// Never escapes a public operation: each variant is converted to the
/// operation's empty result at the boundary, leaving only a log entry.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("invalid or missing argument: {0}")]
    InvalidArgument(&'static str),

    #[error("table '{0}' is not valid or not accessible")]
    InvalidTable(String),

    #[error("field '{field}' does not exist on table '{table}'")]
    InvalidField { table: String, field: String },

    #[error("no record in '{table}' matches '{identifier}'")]
    NotFound { table: String, identifier: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
