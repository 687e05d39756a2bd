//! Configuration type definitions.

use knuffel::Decode;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::InstallError;
use crate::spark::MatchMode;

/// The GCS connector jar installed when no `connector_url` is configured.
pub const DEFAULT_CONNECTOR_URL: &str = "https://repo1.maven.org/maven2/com/google/cloud/bigdataoss/gcs-connector/hadoop2-1.9.17/gcs-connector-hadoop2-1.9.17-shaded.jar";

/// Metadata attribute that only exists on Dataproc VMs.
pub const DEFAULT_METADATA_URL: &str =
    "http://metadata.google.internal/0.1/meta-data/attributes/dataproc-bucket";

/// Credential locations searched in priority order.
pub const DEFAULT_CREDENTIAL_PATTERNS: &[&str] = &[
    "~/.config/gcloud/application_default_credentials.json",
    "~/.config/gcloud/legacy_credentials/*/adc.json",
];

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;

/// Settings accepted by `config get` / `config set`.
pub const SETTING_KEYS: &[&str] = &[
    "connector_url",
    "metadata_url",
    "spark_home",
    "match_mode",
    "probe_timeout_ms",
];

/// Expand tilde (~) prefix to the user's home directory.
/// Handles both "~" alone and "~/path/to/something" patterns.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Main configuration structure parsed from gcs-connector.kdl.
#[derive(Debug, Decode, Clone, Default)]
pub struct Config {
    #[knuffel(child)]
    pub defaults: Option<Defaults>,

    #[knuffel(child)]
    pub credentials: Option<CredentialsConfig>,
}

/// Default settings for the installer.
#[derive(Debug, Decode, Clone, Default)]
pub struct Defaults {
    #[knuffel(property(name = "connector_url"))]
    pub connector_url: Option<String>,

    #[knuffel(property(name = "metadata_url"))]
    pub metadata_url: Option<String>,

    #[knuffel(property(name = "spark_home"))]
    pub spark_home: Option<String>,

    /// "substring" (default) or "exact"
    #[knuffel(property(name = "match_mode"))]
    pub match_mode: Option<String>,

    #[knuffel(property(name = "probe_timeout_ms"))]
    pub probe_timeout_ms: Option<u64>,
}

/// `credentials { pattern "..." }` block overriding the search locations.
#[derive(Debug, Decode, Clone, Default)]
pub struct CredentialsConfig {
    #[knuffel(children(name = "pattern"))]
    pub patterns: Vec<PatternNode>,
}

#[derive(Debug, Decode, Clone)]
pub struct PatternNode {
    #[knuffel(argument)]
    pub glob: String,
}

impl Config {
    /// URL of the connector jar to download.
    pub fn connector_url(&self) -> String {
        self.defaults
            .as_ref()
            .and_then(|d| d.connector_url.clone())
            .unwrap_or_else(|| DEFAULT_CONNECTOR_URL.to_string())
    }

    /// URL probed to detect a Dataproc VM.
    pub fn metadata_url(&self) -> String {
        self.defaults
            .as_ref()
            .and_then(|d| d.metadata_url.clone())
            .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string())
    }

    /// Configured Spark home, with ~ expanded.
    pub fn spark_home(&self) -> Option<PathBuf> {
        self.defaults
            .as_ref()
            .and_then(|d| d.spark_home.as_deref())
            .map(expand_tilde)
    }

    pub fn match_mode(&self) -> MatchMode {
        self.defaults
            .as_ref()
            .and_then(|d| d.match_mode.as_deref())
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    pub fn probe_timeout(&self) -> Duration {
        let ms = self
            .defaults
            .as_ref()
            .and_then(|d| d.probe_timeout_ms)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);
        Duration::from_millis(ms)
    }

    /// Credential glob patterns in priority order.
    /// An empty or missing `credentials` block falls back to the gcloud defaults.
    pub fn credential_patterns(&self) -> Vec<String> {
        match &self.credentials {
            Some(c) if !c.patterns.is_empty() => {
                c.patterns.iter().map(|p| p.glob.clone()).collect()
            }
            _ => DEFAULT_CREDENTIAL_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Reject values that parse as KDL but make no sense to the installer.
    pub fn validate(&self) -> Result<(), InstallError> {
        if let Some(mode) = self.defaults.as_ref().and_then(|d| d.match_mode.as_deref()) {
            mode.parse::<MatchMode>()?;
        }
        if let Some(c) = &self.credentials
            && let Some(empty) = c.patterns.iter().find(|p| p.glob.trim().is_empty())
        {
            return Err(InstallError::config(format!(
                "credential pattern cannot be empty (got {:?})",
                empty.glob
            )));
        }
        Ok(())
    }

    /// Update a default setting
    pub fn set_default(&mut self, key: &str, value: &str) -> Result<(), InstallError> {
        let defaults = self.defaults.get_or_insert(Defaults::default());
        match key {
            "connector_url" => defaults.connector_url = Some(value.to_string()),
            "metadata_url" => defaults.metadata_url = Some(value.to_string()),
            "spark_home" => defaults.spark_home = Some(value.to_string()),
            "match_mode" => {
                value.parse::<MatchMode>()?;
                defaults.match_mode = Some(value.to_string());
            }
            "probe_timeout_ms" => {
                defaults.probe_timeout_ms = Some(value.parse().map_err(|_| {
                    InstallError::validation("Invalid number for probe_timeout_ms")
                })?)
            }
            _ => return Err(unknown_setting(key)),
        }
        Ok(())
    }

    /// Get a default setting value as string
    pub fn get_default(&self, key: &str) -> Result<String, InstallError> {
        match key {
            "connector_url" => Ok(self.connector_url()),
            "metadata_url" => Ok(self.metadata_url()),
            "spark_home" => Ok(self
                .spark_home()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "(not set)".to_string())),
            "match_mode" => Ok(self.match_mode().to_string()),
            "probe_timeout_ms" => Ok(self.probe_timeout().as_millis().to_string()),
            _ => Err(unknown_setting(key)),
        }
    }
}

fn unknown_setting(key: &str) -> InstallError {
    InstallError::validation(format!(
        "Unknown setting: {}. Valid settings: {}",
        key,
        SETTING_KEYS.join(", ")
    ))
}
