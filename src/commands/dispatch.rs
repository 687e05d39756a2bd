//! Top-level dispatch from parsed arguments to command handlers.

use std::path::Path;

use tracing::warn;

use crate::cli::{Cli, Commands, ConfigCommands, InstallArgs};
use crate::config::Config;
use crate::error::InstallError;
use crate::spark::SparkHomeLocator;

use super::{
    InstallOptions, handle_config, handle_config_init, handle_find_credentials, handle_install,
    handle_spark_home, handle_update_config,
};

/// Config for an install run. A config file that cannot be loaded is
/// reported and the built-in defaults are used, so installing never stops here.
fn install_config(explicit: Option<&Path>) -> Config {
    Config::load(explicit).unwrap_or_else(|e| {
        warn!("{}; using built-in defaults", e);
        Config::default()
    })
}

fn install_options(config: &Config, locator: SparkHomeLocator, args: InstallArgs) -> InstallOptions {
    let mut options = InstallOptions::from_config(config, locator);
    options.skip_vm_check = args.skip_vm_check;
    options.skip_download = args.skip_download;
    options.key_file = args.key_file;
    options
}

/// Run the command selected on the command line.
pub async fn run(cli: Cli) -> Result<(), InstallError> {
    let config_path = cli.global.config.as_deref();
    let spark_home = cli.global.spark_home.clone();

    match cli.command {
        None => {
            let config = install_config(config_path);
            let locator = SparkHomeLocator::from_env(spark_home, &config);
            let options = install_options(&config, locator, InstallArgs::default());
            handle_install(&options, false).await
        }
        Some(Commands::Install(args)) => {
            let config = install_config(config_path);
            let locator = SparkHomeLocator::from_env(spark_home, &config);
            let strict = args.strict;
            let options = install_options(&config, locator, args);
            handle_install(&options, strict).await
        }
        // init must work before a config file exists, and on one that no longer parses
        Some(Commands::Config {
            command: Some(ConfigCommands::Init { path, overwrite }),
        }) => handle_config_init(path, overwrite, config_path).map(|_| ()),
        Some(Commands::Config { command }) => {
            let config = Config::load(config_path)?;
            handle_config(command.as_ref(), &config, config_path)
        }
        Some(Commands::FindCredentials) => handle_find_credentials(&Config::load(config_path)?),
        Some(Commands::UpdateConfig { key_file }) => {
            let config = Config::load(config_path)?;
            let locator = SparkHomeLocator::from_env(spark_home, &config);
            handle_update_config(&config, &locator, key_file)
        }
        Some(Commands::SparkHome) => {
            let config = Config::load(config_path)?;
            handle_spark_home(&SparkHomeLocator::from_env(spark_home, &config))
        }
        Some(Commands::Version) => {
            println!("install-gcs-connector {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
