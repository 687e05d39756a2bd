//! Configuration loading and management.

mod loader;
mod types;

pub use types::{
    Config, CredentialsConfig, DEFAULT_CONNECTOR_URL, DEFAULT_CREDENTIAL_PATTERNS,
    DEFAULT_METADATA_URL, Defaults, PatternNode, SETTING_KEYS, expand_tilde,
};
