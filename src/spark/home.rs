//! Locating the Spark installation the connector is installed into.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::Config;
use crate::error::InstallError;

/// Asks the interpreter where the installed pyspark package lives.
const PYSPARK_PROBE: &str = "import os, pyspark; print(os.path.dirname(pyspark.__file__))";

/// Check whether `path` looks like the root of a Spark distribution.
pub fn is_spark_home(path: &Path) -> bool {
    path.join("bin").join("spark-submit").is_file()
        && (path.join("jars").is_dir() || path.join("assembly").is_dir())
}

/// Sources consulted for the Spark home, in priority order.
#[derive(Debug, Clone, Default)]
pub struct SparkHomeLocator {
    /// `--spark-home` flag; trusted as given.
    pub explicit: Option<PathBuf>,
    /// `SPARK_HOME` environment variable; trusted as given.
    pub env: Option<PathBuf>,
    /// `spark_home` from the config file.
    pub configured: Option<PathBuf>,
    /// Interpreters asked for the pyspark package directory.
    pub python_interpreters: Vec<String>,
}

impl SparkHomeLocator {
    /// Build a locator from the CLI flag, the environment and the config file.
    pub fn from_env(explicit: Option<PathBuf>, config: &Config) -> Self {
        let env = std::env::var_os("SPARK_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            explicit,
            env,
            configured: config.spark_home(),
            python_interpreters: vec!["python3".to_string(), "python".to_string()],
        }
    }

    /// Return the first Spark home found.
    pub fn locate(&self) -> Result<PathBuf, InstallError> {
        if let Some(path) = &self.explicit {
            debug!("Using Spark home from --spark-home: {}", path.display());
            return Ok(path.clone());
        }

        if let Some(path) = &self.env {
            debug!("Using Spark home from SPARK_HOME: {}", path.display());
            return Ok(path.clone());
        }

        if let Some(path) = &self.configured {
            if is_spark_home(path) {
                debug!("Using Spark home from config: {}", path.display());
                return Ok(path.clone());
            }
            debug!(
                "Configured spark_home {} is not a Spark distribution",
                path.display()
            );
        }

        for python in &self.python_interpreters {
            if let Some(path) = pyspark_dir(python)
                && is_spark_home(&path)
            {
                debug!("Using Spark home from {} pyspark: {}", python, path.display());
                return Ok(path);
            }
        }

        Err(InstallError::spark_home(
            "set SPARK_HOME, pass --spark-home, or install pyspark",
        ))
    }
}

/// Directory of the pyspark package as reported by `python`, if importable.
fn pyspark_dir(python: &str) -> Option<PathBuf> {
    match Command::new(python).args(["-c", PYSPARK_PROBE]).output() {
        Ok(output) if output.status.success() => {
            let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            }
        }
        Ok(output) => {
            debug!(
                "{} could not import pyspark: {}",
                python,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            None
        }
        Err(e) => {
            debug!("Failed to run {}: {}", python, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spark_home_{}_{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_spark_home(dir: &Path) {
        std::fs::create_dir_all(dir.join("bin")).unwrap();
        std::fs::create_dir_all(dir.join("jars")).unwrap();
        std::fs::write(dir.join("bin/spark-submit"), "#!/bin/sh\n").unwrap();
    }

    #[test]
    fn test_is_spark_home() {
        let dir = temp_dir("detect");
        assert!(!is_spark_home(&dir));
        make_spark_home(&dir);
        assert!(is_spark_home(&dir));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_wins_over_env() {
        let locator = SparkHomeLocator {
            explicit: Some(PathBuf::from("/flag/spark")),
            env: Some(PathBuf::from("/env/spark")),
            ..Default::default()
        };
        assert_eq!(locator.locate().unwrap(), PathBuf::from("/flag/spark"));
    }

    #[test]
    fn test_env_is_trusted() {
        let locator = SparkHomeLocator {
            env: Some(PathBuf::from("/env/spark")),
            configured: Some(PathBuf::from("/conf/spark")),
            ..Default::default()
        };
        assert_eq!(locator.locate().unwrap(), PathBuf::from("/env/spark"));
    }

    #[test]
    fn test_configured_must_look_like_spark() {
        let dir = temp_dir("configured");
        let locator = SparkHomeLocator {
            configured: Some(dir.clone()),
            ..Default::default()
        };
        assert!(matches!(locator.locate(), Err(InstallError::SparkHome(_))));

        make_spark_home(&dir);
        assert_eq!(locator.locate().unwrap(), dir);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_interpreter_is_skipped() {
        let locator = SparkHomeLocator {
            python_interpreters: vec!["definitely-not-a-python-binary".to_string()],
            ..Default::default()
        };
        assert!(locator.locate().is_err());
    }
}
