//! Unified error type for install-gcs-connector.
//!
//! Every step of the installation returns `Result<T, InstallError>`. The
//! variants map one-to-one onto the ways an install can stop early, so the
//! caller can report each of them distinctly instead of swallowing them.

use std::fmt;
use std::path::PathBuf;

/// Command the user runs to create application default credentials.
pub const LOGIN_COMMAND: &str = "gcloud auth application-default login";

/// Command the user runs to retry the installation once credentials exist.
pub const REINSTALL_COMMAND: &str =
    "python3 -m pip install -vvv --upgrade git+https://github.com/bw2/install-gcs-connector.git";

/// The unified error type for all install operations.
#[derive(Debug)]
pub enum InstallError {
    // ── I/O & filesystem ───────────────────────────────────────────────
    /// Filesystem or I/O operation failed.
    Io(std::io::Error),

    // ── Configuration ──────────────────────────────────────────────────
    /// KDL config file parsing or validation error.
    Config(String),

    // ── Network ────────────────────────────────────────────────────────
    /// An HTTP request could not be built, sent, or was answered with an
    /// unexpected status.
    Http { url: String, message: String },

    /// The connector archive could not be fetched or written.
    Download {
        url: String,
        destination: PathBuf,
        message: String,
    },

    // ── Lookup errors ──────────────────────────────────────────────────
    /// None of the credential patterns matched a file.
    NoCredentials { patterns: Vec<String> },

    /// No Spark installation could be located.
    SparkHome(String),

    // ── spark-defaults.conf ────────────────────────────────────────────
    /// Reading or rewriting the Spark config file failed.
    ConfigUpdate {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── User input ─────────────────────────────────────────────────────
    /// User input validation failed.
    Validation(String),

    // ── Catch-all ──────────────────────────────────────────────────────
    Other(String),
}

// ── Display ────────────────────────────────────────────────────────────

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::Io(e) => write!(f, "{}", e),
            InstallError::Config(msg) => write!(f, "config error: {}", msg),
            InstallError::Http { url, message } => write!(f, "request to {} failed: {}", url, message),
            InstallError::Download {
                url,
                destination,
                message,
            } => write!(
                f,
                "Unable to download GCS connector {} to {}. {}",
                url,
                destination.display(),
                message
            ),
            InstallError::NoCredentials { patterns } => write!(
                f,
                "No keys found in these locations: \n{}.\n\
                 Run \n\n  {} \n\n\
                 Then reinstall with: \n\n  {} \n",
                patterns.join(", "),
                LOGIN_COMMAND,
                REINSTALL_COMMAND
            ),
            InstallError::SparkHome(msg) => write!(f, "Spark home not found: {}", msg),
            InstallError::ConfigUpdate { path, source } => write!(
                f,
                "Unable to update spark config {}. {}",
                path.display(),
                source
            ),
            InstallError::Validation(msg) => write!(f, "{}", msg),
            InstallError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstallError::Io(e) => Some(e),
            InstallError::ConfigUpdate { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ── From implementations for common error types ────────────────────────

impl From<std::io::Error> for InstallError {
    fn from(e: std::io::Error) -> Self {
        InstallError::Io(e)
    }
}

impl From<knuffel::Error> for InstallError {
    fn from(e: knuffel::Error) -> Self {
        InstallError::Config(e.to_string())
    }
}

// ── Convenience constructors ───────────────────────────────────────────

impl InstallError {
    /// Create an HTTP error for the given URL.
    pub fn http(url: impl Into<String>, message: impl fmt::Display) -> Self {
        InstallError::Http {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a download error.
    pub fn download(
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
        message: impl fmt::Display,
    ) -> Self {
        InstallError::Download {
            url: url.into(),
            destination: destination.into(),
            message: message.to_string(),
        }
    }

    /// Create a config update error.
    pub fn config_update(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::ConfigUpdate {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        InstallError::Config(message.into())
    }

    /// Create a Spark home lookup error.
    pub fn spark_home(message: impl Into<String>) -> Self {
        InstallError::SparkHome(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        InstallError::Validation(message.into())
    }
}

/// Convenience type alias for Results using InstallError.
pub type Result<T> = std::result::Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials_message_lists_remediation() {
        let err = InstallError::NoCredentials {
            patterns: vec!["~/a.json".to_string(), "~/b/*/adc.json".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("~/a.json, ~/b/*/adc.json."));
        assert!(msg.contains("gcloud auth application-default login"));
        assert!(msg.contains("python3 -m pip install -vvv --upgrade"));
    }

    #[test]
    fn test_config_update_exposes_source() {
        use std::error::Error;

        let err = InstallError::config_update(
            "/nope/spark-defaults.conf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Unable to update spark config /nope/spark-defaults.conf"));
    }
}
