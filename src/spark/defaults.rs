//! Merging the GCS service-account settings into `spark-defaults.conf`.
//!
//! The two managed lines are always written first, in a fixed order, followed
//! by every pre-existing line that does not set one of the managed keys. The
//! file is read once and overwritten in place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::InstallError;

pub const ENABLE_KEY: &str = "spark.hadoop.google.cloud.auth.service.account.enable";
pub const KEYFILE_KEY: &str = "spark.hadoop.google.cloud.auth.service.account.json.keyfile";

/// Keys owned by the installer, in the order they are written.
pub const MANAGED_KEYS: [&str; 2] = [ENABLE_KEY, KEYFILE_KEY];

pub const SPARK_DEFAULTS_FILE: &str = "spark-defaults.conf";

/// How an existing line is recognized as a stale managed setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Drop any line that mentions a managed key anywhere, comments included.
    #[default]
    Substring,
    /// Drop only lines whose key is exactly a managed key.
    ExactKey,
}

impl MatchMode {
    /// Whether `line` is superseded by the managed settings.
    pub fn is_managed(self, line: &str) -> bool {
        match self {
            MatchMode::Substring => MANAGED_KEYS.iter().any(|key| line.contains(key)),
            MatchMode::ExactKey => {
                // Java properties accept whitespace, '=' or ':' as separator.
                let key = line
                    .trim_start()
                    .split(|c: char| c.is_whitespace() || c == '=' || c == ':')
                    .next()
                    .unwrap_or("");
                MANAGED_KEYS.contains(&key)
            }
        }
    }
}

impl FromStr for MatchMode {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substring" => Ok(MatchMode::Substring),
            "exact" => Ok(MatchMode::ExactKey),
            other => Err(InstallError::config(format!(
                "Unknown match_mode '{}'. Valid modes: substring, exact",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Substring => write!(f, "substring"),
            MatchMode::ExactKey => write!(f, "exact"),
        }
    }
}

/// The two lines written at the top of the file.
pub fn managed_lines(key_file: &Path) -> [String; 2] {
    [
        format!("{} true", ENABLE_KEY),
        format!("{} {}", KEYFILE_KEY, key_file.display()),
    ]
}

/// Produce the new file content from the current content (if any).
pub fn merge(existing: Option<&str>, key_file: &Path, mode: MatchMode) -> String {
    let mut lines: Vec<String> = managed_lines(key_file).into();

    if let Some(content) = existing {
        for line in content.lines() {
            if mode.is_managed(line) {
                debug!("Dropping superseded line: {}", line);
                continue;
            }
            lines.push(line.to_string());
        }
    }

    let mut output = String::new();
    for line in &lines {
        output.push_str(line);
        output.push('\n');
    }
    output
}

/// Rewrite `path` so it points Spark at `key_file`.
///
/// A missing file is created. Any read or write failure is returned as
/// [`InstallError::ConfigUpdate`]; the file is left untouched when reading fails.
pub fn update_spark_defaults(
    path: &Path,
    key_file: &Path,
    mode: MatchMode,
) -> Result<(), InstallError> {
    let existing = if path.is_file() {
        Some(std::fs::read_to_string(path).map_err(|e| InstallError::config_update(path, e))?)
    } else {
        None
    };

    let content = merge(existing.as_deref(), key_file, mode);
    std::fs::write(path, content).map_err(|e| InstallError::config_update(path, e))?;
    Ok(())
}

/// Create `<spark_home>/conf` if needed and return the path of
/// `spark-defaults.conf` inside it.
pub fn spark_defaults_path(spark_home: &Path) -> Result<PathBuf, InstallError> {
    let conf_dir = spark_home.join("conf");
    if !conf_dir.exists() {
        info!("Creating {}", conf_dir.display());
        std::fs::create_dir(&conf_dir)
            .map_err(|e| InstallError::config_update(conf_dir.clone(), e))?;
    }
    Ok(conf_dir.join(SPARK_DEFAULTS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PathBuf {
        PathBuf::from("/x/y.json")
    }

    #[test]
    fn test_merge_replaces_stale_enable_line() {
        let existing = format!("foo.bar baz\n{} false\n", ENABLE_KEY);
        let merged = merge(Some(&existing), &key(), MatchMode::Substring);
        assert_eq!(
            merged,
            format!(
                "{} true\n{} /x/y.json\nfoo.bar baz\n",
                ENABLE_KEY, KEYFILE_KEY
            )
        );
    }

    #[test]
    fn test_merge_without_existing_file() {
        let merged = merge(None, &key(), MatchMode::Substring);
        assert_eq!(merged, format!("{} true\n{} /x/y.json\n", ENABLE_KEY, KEYFILE_KEY));
    }

    #[test]
    fn test_merge_preserves_unrelated_order() {
        let existing = format!(
            "# header\nspark.master local[*]\n{} /old/key.json\n\nspark.driver.memory 4g\n{} true\n",
            KEYFILE_KEY, ENABLE_KEY
        );
        let merged = merge(Some(&existing), &key(), MatchMode::Substring);
        let lines: Vec<&str> = merged.lines().collect();
        assert_eq!(
            lines,
            vec![
                format!("{} true", ENABLE_KEY).as_str(),
                format!("{} /x/y.json", KEYFILE_KEY).as_str(),
                "# header",
                "spark.master local[*]",
                "",
                "spark.driver.memory 4g",
            ]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = "spark.master yarn\n";
        let once = merge(Some(existing), &key(), MatchMode::Substring);
        let twice = merge(Some(&once), &key(), MatchMode::Substring);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_terminates_last_line() {
        let merged = merge(Some("spark.master yarn"), &key(), MatchMode::Substring);
        assert!(merged.ends_with("spark.master yarn\n"));
    }

    #[test]
    fn test_substring_mode_drops_mentions() {
        let comment = format!("# {} note", ENABLE_KEY);
        assert!(MatchMode::Substring.is_managed(&comment));
        assert!(!MatchMode::ExactKey.is_managed(&comment));
    }

    #[test]
    fn test_exact_mode_matches_key_token() {
        assert!(MatchMode::ExactKey.is_managed(&format!("{} false", ENABLE_KEY)));
        assert!(MatchMode::ExactKey.is_managed(&format!("  {}=/k.json", KEYFILE_KEY)));
        assert!(!MatchMode::ExactKey.is_managed(&format!("{}.extra true", ENABLE_KEY)));
        assert!(!MatchMode::ExactKey.is_managed("spark.master yarn"));
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("substring".parse::<MatchMode>().unwrap(), MatchMode::Substring);
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::ExactKey);
        assert!("loose".parse::<MatchMode>().is_err());
    }
}
