//! Read-only record access façade: identifier resolution, field
//! flattening, and reference lookups over an external record store.
//!
//! Every public operation is fail-soft: validation failures, missing
//! records, and store faults all come back as the operation's empty shape
//! (`None`, an empty `Vec`, or an empty JSON container for the `_as_text`
//! variants), with the distinction carried only by the log stream.

pub mod accessor;
pub mod error;

pub use accessor::RecordAccessor;
pub use error::AccessError;
