//! Install command - the full post-install sequence.
//!
//! Steps run strictly in order and the first failure ends the run. Failures
//! are returned as [`InstallOutcome::Failed`] rather than raised, so the
//! caller decides whether an incomplete install is fatal.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::credentials::{KeyFileInfo, discover_credentials, key_file_path};
use crate::error::InstallError;
use crate::net::{download_connector, is_dataproc_vm, jar_destination};
use crate::spark::{MatchMode, SparkHomeLocator, spark_defaults_path, update_spark_defaults};

/// Everything the install sequence needs, resolved from flags and config.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub spark_home: SparkHomeLocator,
    pub connector_url: String,
    pub metadata_url: String,
    pub probe_timeout: Duration,
    pub skip_vm_check: bool,
    pub skip_download: bool,
    /// Use this key file instead of searching `credential_patterns`.
    pub key_file: Option<PathBuf>,
    pub credential_patterns: Vec<String>,
    pub match_mode: MatchMode,
}

impl InstallOptions {
    pub fn from_config(config: &Config, spark_home: SparkHomeLocator) -> Self {
        Self {
            spark_home,
            connector_url: config.connector_url(),
            metadata_url: config.metadata_url(),
            probe_timeout: config.probe_timeout(),
            skip_vm_check: false,
            skip_download: false,
            key_file: None,
            credential_patterns: config.credential_patterns(),
            match_mode: config.match_mode(),
        }
    }
}

/// How an install run ended.
#[derive(Debug)]
pub enum InstallOutcome {
    /// Dataproc VMs ship the connector; nothing was changed.
    OnDataprocVm,
    Installed {
        jar: PathBuf,
        key_file: PathBuf,
        spark_config: PathBuf,
    },
    /// A step failed; earlier steps (e.g. the jar download) are kept.
    Failed(InstallError),
}

fn resolve_key_file(options: &InstallOptions) -> Result<PathBuf, InstallError> {
    let path = match &options.key_file {
        Some(path) => path.clone(),
        None => discover_credentials(&options.credential_patterns)?.path,
    };
    key_file_path(&path)
}

/// Run the install sequence and report each step through tracing.
pub async fn run_install(options: &InstallOptions) -> InstallOutcome {
    if !options.skip_vm_check
        && is_dataproc_vm(&options.metadata_url, options.probe_timeout).await
    {
        info!("Running on a Dataproc VM which should already have the GCS cloud connector installed.");
        return InstallOutcome::OnDataprocVm;
    }

    let spark_home = match options.spark_home.locate() {
        Ok(path) => path,
        Err(e) => {
            warn!("{}", e);
            return InstallOutcome::Failed(e);
        }
    };
    info!("Spark home: {}", spark_home.display());

    let jar = if options.skip_download {
        match jar_destination(&options.connector_url, &spark_home) {
            Ok(path) => {
                info!("Skipping download; expecting connector at {}", path.display());
                path
            }
            Err(e) => {
                warn!("{}", e);
                return InstallOutcome::Failed(e);
            }
        }
    } else {
        match download_connector(&options.connector_url, &spark_home).await {
            Ok(path) => path,
            Err(e) => {
                warn!("{}", e);
                return InstallOutcome::Failed(e);
            }
        }
    };

    let key_file = match resolve_key_file(options) {
        Ok(path) => path,
        Err(e) => {
            for line in e.to_string().lines() {
                error!("{}", line);
            }
            return InstallOutcome::Failed(e);
        }
    };
    match KeyFileInfo::read(&key_file) {
        Some(info) => info!("Using key file: {} [{}]", key_file.display(), info.describe()),
        None => info!("Using key file: {}", key_file.display()),
    }

    let spark_config = match spark_defaults_path(&spark_home) {
        Ok(path) => path,
        Err(e) => {
            warn!("{}", e);
            return InstallOutcome::Failed(e);
        }
    };
    info!(
        "Setting json.keyfile to {} in {}",
        key_file.display(),
        spark_config.display()
    );
    if let Err(e) = update_spark_defaults(&spark_config, &key_file, options.match_mode) {
        warn!("{}", e);
        return InstallOutcome::Failed(e);
    }

    InstallOutcome::Installed {
        jar,
        key_file,
        spark_config,
    }
}

/// Handle the install command. Only `strict` turns a failed run into an error.
pub async fn handle_install(options: &InstallOptions, strict: bool) -> Result<(), InstallError> {
    match run_install(options).await {
        // the cause has already been logged by run_install
        InstallOutcome::Failed(_) if strict => Err(InstallError::Other(
            "GCS connector installation failed".to_string(),
        )),
        InstallOutcome::Failed(_) => {
            warn!("GCS connector installation incomplete; see messages above.");
            Ok(())
        }
        InstallOutcome::Installed { jar, .. } => {
            info!("GCS connector installed: {}", jar.display());
            Ok(())
        }
        InstallOutcome::OnDataprocVm => Ok(()),
    }
}
