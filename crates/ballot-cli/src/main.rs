//! Ballot CLI - command-line driver for the delegated-vote ballot.
//!
//! Deploys a ballot to a local state file and applies rights grants,
//! delegations and votes to it.

pub mod commands;
pub mod config;
pub mod output;
pub mod state;
pub mod telemetry;

use clap::Parser;

use crate::config::CliConfig;
use crate::state::StateFile;

fn main() {
    let cli = commands::Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::config_path);
    let config = match CliConfig::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Error: {:#}", e));
            std::process::exit(1);
        }
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone())
    };
    if let Err(e) = telemetry::init_telemetry(&level, config.json_logs) {
        output::print_warning(&format!("Logging disabled: {}", e));
    }

    let state = StateFile::new(cli.state.unwrap_or_else(|| config.state_file.clone()));
    if let Err(e) = commands::run(cli.command, &config, &config_path, &state) {
        output::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
