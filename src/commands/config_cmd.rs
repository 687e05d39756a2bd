//! Config command handlers - managing the installer's own configuration.

use std::path::{Path, PathBuf};

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::error::InstallError;

/// Handle `config` and its subcommands. With no subcommand the effective
/// configuration is shown.
pub fn handle_config(
    command: Option<&ConfigCommands>,
    config: &Config,
    explicit_path: Option<&Path>,
) -> Result<(), InstallError> {
    match command {
        None | Some(ConfigCommands::Show) => {
            match explicit_path
                .map(Path::to_path_buf)
                .or_else(Config::find_existing_config)
            {
                Some(path) => eprintln!("// loaded from {}", path.display()),
                None => eprintln!("// no config file found, showing built-in defaults"),
            }
            print!("{}", config.to_kdl());
        }
        Some(ConfigCommands::Init { path, overwrite }) => {
            handle_config_init(path.clone(), *overwrite, explicit_path)?;
        }
        Some(ConfigCommands::Get { key }) => {
            println!("{}", config.get_default(key)?);
        }
        Some(ConfigCommands::Set { key, value }) => {
            let config_path = explicit_path
                .map(Path::to_path_buf)
                .or_else(Config::find_existing_config)
                .ok_or_else(|| {
                    InstallError::validation(
                        "Config file not found. Run 'install-gcs-connector config init' first.",
                    )
                })?;
            let mut on_disk = Config::load_from_path(&config_path)?;
            on_disk.set_default(key, value)?;
            on_disk.save(&config_path)?;
            println!("Set {} = {} in {}", key, value, config_path.display());
        }
    }
    Ok(())
}

/// Handle `config init`. Writes to `path`, else to the `--config` path, else
/// to the default location. Never reads an existing config, so it also
/// repairs a file that no longer parses.
pub fn handle_config_init(
    path: Option<PathBuf>,
    overwrite: bool,
    explicit_path: Option<&Path>,
) -> Result<PathBuf, InstallError> {
    let target = path.or_else(|| explicit_path.map(Path::to_path_buf));
    let config_path = Config::generate_config_file(target, overwrite)?;
    println!("Config file generated at: {}", config_path.display());
    Ok(config_path)
}
