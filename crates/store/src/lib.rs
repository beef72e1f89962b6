pub mod memory;
pub mod traits;

pub use memory::{MemoryStore, RecordDraft, StoredRecord};
pub use traits::{Record, RecordStore, StoreError};
