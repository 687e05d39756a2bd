//! Command and subcommand definitions.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Top-level commands. Running without a command is the same as `install`.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the connector, find credentials and update spark-defaults.conf
    Install(InstallArgs),
    /// Print the credentials file that install would use
    FindCredentials,
    /// Point spark-defaults.conf at a key file without downloading anything
    UpdateConfig {
        /// Service-account or application-default credentials JSON
        key_file: PathBuf,
    },
    /// Print the Spark home that install would use
    SparkHome,
    /// Manage configuration (shows current config if no subcommand provided)
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Print version information
    Version,
}

/// Flags of the install command.
#[derive(Debug, Default, Clone, Args)]
pub struct InstallArgs {
    /// Install even when running on a Dataproc VM
    #[arg(long)]
    pub skip_vm_check: bool,

    /// Assume the connector jar is already in <spark_home>/jars
    #[arg(long)]
    pub skip_download: bool,

    /// Use this key file instead of searching the gcloud config directory
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Exit with an error status when any step fails
    #[arg(long)]
    pub strict: bool,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with the default settings
    Init {
        /// Path where to create the config file (default: ~/.config/gcs-connector/gcs-connector.kdl)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite existing config file if it exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Show the effective configuration
    Show,
    /// Get a specific configuration value
    Get {
        /// Setting key (e.g., "connector_url", "spark_home", "match_mode")
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}
