pub mod config;
pub mod record;

pub use config::{load_dotenv, AccessConfig};
pub use record::{FieldValue, FlattenedRecord};
