//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path`.

use clap::Subcommand;
use concierge::config::ConfigFile;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write the current configuration (defaults for missing keys) to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(runner: &CliRunner, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { force } => run_init(runner, force),
        ConfigCommands::Show => run_show(runner.config()),
        ConfigCommands::Path => {
            println!("{}", runner.config_path().display());
            Ok(())
        }
    }
}

fn run_init(runner: &CliRunner, force: bool) -> Result<(), CliError> {
    let path = runner.config_path();
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    runner.config().save(path)?;
    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize the kiosk.");
    println!("Set {} to enable itinerary generation.", runner.config().generation.api_key_env);
    Ok(())
}

fn run_show(config: &ConfigFile) -> Result<(), CliError> {
    print!("{}", config.to_ini_string());
    Ok(())
}
