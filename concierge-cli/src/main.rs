//! Concierge CLI - Command-line interface
//!
//! Drives the concierge kiosk core from a terminal: place search with ride
//! quotes, recommendation distances and streamed itinerary generation.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::itinerary::ItineraryArgs;
use commands::search::SearchArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "concierge")]
#[command(version, about = "Hotel concierge kiosk from the command line", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/concierge/concierge.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the built-in place catalog and never call network services
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for places near the hotel
    Search {
        /// What to look for, e.g. "pizza"
        #[arg(required = true)]
        query: Vec<String>,

        /// Quote a ride to the N-th result
        #[arg(long, value_name = "N")]
        select: Option<usize>,
    },

    /// Show how far named places are from the guest
    Distance {
        /// Place names (default: recommendations from the configured feed)
        names: Vec<String>,
    },

    /// Estimate a ride fare between two coordinates
    Ride {
        /// Destination as "lat,lon"
        to: String,

        /// Origin as "lat,lon" (default: the hotel)
        #[arg(long)]
        from: Option<String>,
    },

    /// Generate a personalised itinerary
    Itinerary {
        /// Guest profile JSON (default: [data] profile_path)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Recommendation feed JSON (default: [data] feed_path)
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Replay a saved itinerary JSON document instead of calling the model
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(cli.config, cli.offline)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config(format!("failed to start runtime: {}", e)))?;

    match cli.command {
        Commands::Search { query, select } => {
            runner.log_startup("search");
            let args = SearchArgs {
                query: query.join(" "),
                select,
            };
            runtime.block_on(commands::search::run(&runner, args))
        }
        Commands::Distance { names } => {
            runner.log_startup("distance");
            runtime.block_on(commands::distance::run(&runner, names))
        }
        Commands::Ride { to, from } => {
            runner.log_startup("ride");
            commands::ride::run(&runner, from.as_deref(), &to)
        }
        Commands::Itinerary {
            profile,
            feed,
            script,
        } => {
            runner.log_startup("itinerary");
            let args = ItineraryArgs {
                profile,
                feed,
                script,
            };
            runtime.block_on(commands::itinerary::run(&runner, args))
        }
        Commands::Config { command } => commands::config::run(&runner, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_joins_words_and_accepts_global_flags() {
        let cli = Cli::try_parse_from(["concierge", "search", "pizza", "near", "me", "--offline"])
            .unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::Search { query, select } => {
                assert_eq!(query.join(" "), "pizza near me");
                assert_eq!(select, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_a_query() {
        assert!(Cli::try_parse_from(["concierge", "search"]).is_err());
    }

    #[test]
    fn test_itinerary_paths() {
        let cli = Cli::try_parse_from([
            "concierge",
            "--config",
            "/tmp/kiosk.ini",
            "itinerary",
            "--script",
            "demos/itinerary.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/kiosk.ini")));
        match cli.command {
            Commands::Itinerary { script, profile, .. } => {
                assert_eq!(script, Some(PathBuf::from("demos/itinerary.json")));
                assert!(profile.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["concierge", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Init { force: true }
            }
        ));
    }
}
