//! Command handlers for the install-gcs-connector CLI.
//!
//! This module contains all the command handler functions, organized by command type.

mod config_cmd;
mod credentials;
mod dispatch;
mod install;
mod update_config;

pub use config_cmd::{handle_config, handle_config_init};
pub use credentials::{handle_find_credentials, handle_spark_home};
pub use dispatch::run;
pub use install::{InstallOptions, InstallOutcome, handle_install, run_install};
pub use update_config::handle_update_config;
