use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Length that marks an identifier as an opaque key rather than a
/// business key.
pub const DEFAULT_OPAQUE_KEY_LEN: usize = 32;

/// Field holding a table's human-readable business key.
pub const DEFAULT_BUSINESS_KEY_FIELD: &str = "number";

/// Well-known free-text field returned by the short-text accessor.
pub const DEFAULT_SHORT_TEXT_FIELD: &str = "short_description";

/// Tunables for record resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub opaque_key_len: usize,
    pub business_key_field: String,
    pub short_text_field: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            opaque_key_len: DEFAULT_OPAQUE_KEY_LEN,
            business_key_field: DEFAULT_BUSINESS_KEY_FIELD.to_string(),
            short_text_field: DEFAULT_SHORT_TEXT_FIELD.to_string(),
        }
    }
}

impl AccessConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            opaque_key_len: env_usize("RECVIEW_OPAQUE_KEY_LEN", DEFAULT_OPAQUE_KEY_LEN),
            business_key_field: env_or("RECVIEW_BUSINESS_KEY_FIELD", DEFAULT_BUSINESS_KEY_FIELD),
            short_text_field: env_or("RECVIEW_SHORT_TEXT_FIELD", DEFAULT_SHORT_TEXT_FIELD),
        }
    }

    /// Length-only identifier classification. A business key that happens
    /// to be exactly `opaque_key_len` characters is treated as an opaque
    /// key; the source system has no fallback and neither do we.
    pub fn is_opaque_key(&self, identifier: &str) -> bool {
        identifier.len() == self.opaque_key_len
    }
}
