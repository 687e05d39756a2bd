//! Configuration file loading and saving.

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::InstallError;

const CONFIG_FILE_NAME: &str = "gcs-connector.kdl";
const CONFIG_DIR_NAME: &str = "gcs-connector";

/// Quote `value` as a KDL string.
fn kdl_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

impl Config {
    /// Get the explicit ~/.config/gcs-connector/gcs-connector.kdl path (XDG-style, cross-platform)
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Get the list of config file search paths in priority order
    fn get_config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. ./gcs-connector.kdl (current directory)
        paths.push(PathBuf::from(CONFIG_FILE_NAME));

        // 2. ~/.config/gcs-connector/gcs-connector.kdl
        if let Some(xdg_path) = Self::xdg_config_path() {
            paths.push(xdg_path);
        }

        // 3. Platform-native config directory (~/Library/Application Support/ on macOS)
        // Skip if it's the same as the XDG path (e.g., on Linux where they're identical)
        if let Some(config_dir) = dirs::config_dir() {
            let native_path = config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if Self::xdg_config_path().as_ref() != Some(&native_path) {
                paths.push(native_path);
            }
        }

        // 4. ~/.local/share/gcs-connector/gcs-connector.kdl
        if let Some(data_dir) = dirs::data_dir() {
            paths.push(data_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }

        paths
    }

    /// Find existing config file by searching all standard locations
    pub fn find_existing_config() -> Option<PathBuf> {
        Self::get_config_search_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    /// Get the default config path (~/.config/gcs-connector/gcs-connector.kdl)
    pub fn default_config_path() -> PathBuf {
        Self::xdg_config_path().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, InstallError> {
        let content = std::fs::read_to_string(path)?;
        let config = knuffel::parse::<Config>(CONFIG_FILE_NAME, &content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or search the standard
    /// locations. No config file at all means built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, InstallError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(InstallError::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            return Self::load_from_path(path);
        }

        match Self::find_existing_config() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    /// Generate a config file with default values
    pub fn generate_config_file(
        path: Option<PathBuf>,
        overwrite: bool,
    ) -> Result<PathBuf, InstallError> {
        let config_path = path.unwrap_or_else(Self::default_config_path);

        if config_path.exists() && !overwrite {
            return Err(InstallError::validation(format!(
                "Config file already exists at: {}. Use --overwrite to replace it.",
                config_path.display()
            )));
        }

        if let Some(parent) = config_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let kdl_content = r#"// install-gcs-connector configuration
// Every setting is optional; the values below are the built-in defaults.

// match_mode="substring" drops any spark-defaults.conf line mentioning a
// managed key; match_mode="exact" only drops lines whose key matches exactly.
defaults match_mode="substring" probe_timeout_ms=2000
// connector_url="https://repo1.maven.org/maven2/com/google/cloud/bigdataoss/gcs-connector/hadoop2-1.9.17/gcs-connector-hadoop2-1.9.17-shaded.jar"
// spark_home="~/spark"

// Credential files are searched in order; the first pattern with a match wins.
credentials {
    pattern "~/.config/gcloud/application_default_credentials.json"
    pattern "~/.config/gcloud/legacy_credentials/*/adc.json"
}
"#;

        std::fs::write(&config_path, kdl_content)?;
        Ok(config_path)
    }

    /// Serialize the effective config to KDL format
    pub fn to_kdl(&self) -> String {
        let mut output = String::new();

        output.push_str("// install-gcs-connector configuration file\n\n");

        output.push_str("defaults");
        output.push_str(&format!(" connector_url={}", kdl_string(&self.connector_url())));
        output.push_str(&format!(" metadata_url={}", kdl_string(&self.metadata_url())));
        if let Some(spark_home) = self.defaults.as_ref().and_then(|d| d.spark_home.as_ref()) {
            output.push_str(&format!(" spark_home={}", kdl_string(spark_home)));
        }
        output.push_str(&format!(
            " match_mode={}",
            kdl_string(&self.match_mode().to_string())
        ));
        output.push_str(&format!(
            " probe_timeout_ms={}",
            self.probe_timeout().as_millis()
        ));
        output.push('\n');

        output.push_str("\ncredentials {\n");
        for pattern in self.credential_patterns() {
            output.push_str(&format!("    pattern {}\n", kdl_string(&pattern)));
        }
        output.push_str("}\n");

        output
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), InstallError> {
        std::fs::write(path, self.to_kdl())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialsConfig, PatternNode};

    #[test]
    fn test_search_paths_end_with_file_name() {
        for path in Config::get_config_search_paths() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_to_kdl_parses_back() {
        let mut config = Config::default();
        config.set_default("spark_home", "/opt/spark").unwrap();
        config.set_default("match_mode", "exact").unwrap();

        let kdl = config.to_kdl();
        let parsed = knuffel::parse::<Config>("roundtrip.kdl", &kdl).unwrap();
        assert_eq!(parsed.spark_home(), Some(PathBuf::from("/opt/spark")));
        assert_eq!(parsed.match_mode(), config.match_mode());
        assert_eq!(parsed.credential_patterns(), config.credential_patterns());
    }

    #[test]
    fn test_to_kdl_escapes_strings() {
        let mut config = Config::default();
        config.set_default("spark_home", r"C:\spark").unwrap();
        config.credentials = Some(CredentialsConfig {
            patterns: vec![PatternNode {
                glob: r#"/keys/"quoted"/*.json"#.to_string(),
            }],
        });

        let kdl = config.to_kdl();
        let parsed = knuffel::parse::<Config>("roundtrip.kdl", &kdl).unwrap();
        assert_eq!(parsed.spark_home(), Some(PathBuf::from(r"C:\spark")));
        assert_eq!(
            parsed.credential_patterns(),
            vec![r#"/keys/"quoted"/*.json"#.to_string()]
        );
    }

    #[test]
    fn test_kdl_string() {
        assert_eq!(kdl_string("plain"), r#""plain""#);
        assert_eq!(kdl_string(r#"a\b"c"#), r#""a\\b\"c""#);
    }
}
