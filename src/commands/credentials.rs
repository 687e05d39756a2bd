//! Credential and Spark-home lookup commands.

use chrono_humanize::HumanTime;

use crate::config::Config;
use crate::credentials::{KeyFileInfo, discover_credentials};
use crate::error::InstallError;
use crate::spark::SparkHomeLocator;

/// Handle the find-credentials command - print the key file install would use.
pub fn handle_find_credentials(config: &Config) -> Result<(), InstallError> {
    let patterns = config.credential_patterns();
    let found = discover_credentials(&patterns)?;

    println!("{}", found.path.display());
    let age = HumanTime::from(found.created);
    match KeyFileInfo::read(&found.path) {
        Some(info) => eprintln!("  {} | created {}", info.describe(), age),
        None => eprintln!("  created {}", age),
    }
    Ok(())
}

/// Handle the spark-home command - print the Spark home install would use.
pub fn handle_spark_home(locator: &SparkHomeLocator) -> Result<(), InstallError> {
    let home = locator.locate()?;
    println!("{}", home.display());
    Ok(())
}
