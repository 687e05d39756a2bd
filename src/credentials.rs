//! Discovery of the gcloud credentials file Spark should authenticate with.
//!
//! Patterns are tried in priority order. Within one pattern the most recently
//! created match wins; the first pattern with any match ends the search, so a
//! newer file matched by a later pattern never beats an older one matched by
//! an earlier pattern.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::expand_tilde;
use crate::error::InstallError;
use crate::utils::glob_paths;

/// A file matched by a credential pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsCandidate {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
}

impl CredentialsCandidate {
    /// Stat `path` and record its creation time.
    pub fn from_path(path: PathBuf) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(&path)?;
        Ok(Self {
            created: creation_time(&metadata)?,
            path,
        })
    }
}

/// The inode change time on Unix, the birth time elsewhere.
#[cfg(unix)]
fn creation_time(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "ctime out of range")
    })
}

#[cfg(not(unix))]
fn creation_time(metadata: &Metadata) -> std::io::Result<DateTime<Utc>> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(time))
}

/// Pick the most recently created candidate. On a tie the earlier one wins.
pub fn newest(candidates: Vec<CredentialsCandidate>) -> Option<CredentialsCandidate> {
    let mut best: Option<CredentialsCandidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.created <= current.created => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Search `patterns` in order and return the newest match of the first
/// pattern that matches anything.
pub fn find_credentials<S: AsRef<str>>(patterns: &[S]) -> Option<CredentialsCandidate> {
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let candidates: Vec<CredentialsCandidate> = glob_paths(pattern)
            .into_iter()
            .filter_map(|path| match CredentialsCandidate::from_path(path.clone()) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        debug!("{} match(es) for {}", candidates.len(), pattern);
        if let Some(found) = newest(candidates) {
            return Some(found);
        }
    }
    None
}

/// Like [`find_credentials`], but a miss becomes [`InstallError::NoCredentials`]
/// carrying the remediation instructions.
pub fn discover_credentials<S: AsRef<str>>(
    patterns: &[S],
) -> Result<CredentialsCandidate, InstallError> {
    find_credentials(patterns).ok_or_else(|| InstallError::NoCredentials {
        patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
    })
}

/// Turn a user-supplied key file path into the absolute path written to
/// spark-defaults.conf. `~` is expanded and the file must exist.
pub fn key_file_path(path: &Path) -> Result<PathBuf, InstallError> {
    let expanded = expand_tilde(&path.to_string_lossy());
    if !expanded.is_file() {
        return Err(InstallError::validation(format!(
            "Key file {} does not exist",
            expanded.display()
        )));
    }
    // Spark resolves relative paths against its own working directory.
    Ok(std::path::absolute(&expanded)?)
}

/// Fields of a gcloud key file worth reporting. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyFileInfo {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub client_email: Option<String>,
    pub client_id: Option<String>,
}

impl KeyFileInfo {
    /// Read and parse `path`. Returns `None` when it is not a JSON object.
    pub fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// One-line description for logs, e.g. "service_account (svc@proj.iam.gserviceaccount.com)".
    pub fn describe(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("unknown type");
        match self.client_email.as_deref().or(self.client_id.as_deref()) {
            Some(who) => format!("{} ({})", kind, who),
            None => kind.to_string(),
        }
    }
}
