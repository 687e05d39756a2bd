//! Update-config command - rewrite spark-defaults.conf without downloading.

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::credentials::key_file_path;
use crate::error::InstallError;
use crate::spark::{SparkHomeLocator, spark_defaults_path, update_spark_defaults};

/// Handle the update-config command
pub fn handle_update_config(
    config: &Config,
    locator: &SparkHomeLocator,
    key_file: PathBuf,
) -> Result<(), InstallError> {
    let key_file = key_file_path(&key_file)?;

    let spark_home = locator.locate()?;
    let spark_config = spark_defaults_path(&spark_home)?;
    info!(
        "Setting json.keyfile to {} in {}",
        key_file.display(),
        spark_config.display()
    );
    update_spark_defaults(&spark_config, &key_file, config.match_mode())?;
    println!("Updated {}", spark_config.display());
    Ok(())
}
