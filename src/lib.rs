//! install-gcs-connector - a post-install step that makes a local Spark
//! installation able to read and write Google Cloud Storage.
//!
//! This crate provides functionality to:
//! - Detect Dataproc VMs, which already ship the connector
//! - Download the GCS connector jar into `<spark_home>/jars`
//! - Find the newest gcloud credentials file
//! - Point `spark-defaults.conf` at those credentials
//!
//! # Example
//!
//! ```no_run
//! use gcs_connector::{Config, InstallOptions, SparkHomeLocator, run_install};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let locator = SparkHomeLocator::from_env(None, &config);
//!     let outcome = run_install(&InstallOptions::from_config(&config, locator)).await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod net;
pub mod spark;
pub mod utils;

// Re-export commonly used types at the crate root
pub use commands::{InstallOptions, InstallOutcome, run_install};
pub use config::Config;
pub use credentials::{CredentialsCandidate, find_credentials};
pub use error::{InstallError, Result};
pub use spark::{MatchMode, SparkHomeLocator, update_spark_defaults};
