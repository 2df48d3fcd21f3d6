//! CLI command implementations.
//!
//! Each invocation loads the ballot from its state file, applies one
//! operation and writes it back.

use anyhow::{bail, Context as _};
use ballot_governance::{Ballot, DelegationOutcome};
use ballot_types::Address;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use crate::config::CliConfig;
use crate::output::*;
use crate::state::StateFile;

/// Main CLI.
#[derive(Parser)]
#[command(name = "ballot")]
#[command(about = "Delegated-vote ballot with a single chairperson")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Ballot state file (overrides the configured one)
    #[arg(short, long, global = true, env = "BALLOT_STATE")]
    pub state: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, global = true, env = "BALLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new ballot
    Deploy {
        /// Proposal names, in order
        #[arg(required = true)]
        proposals: Vec<String>,
        /// Chairperson identity
        #[arg(long)]
        chairperson: String,
        /// Replace an existing ballot
        #[arg(long)]
        force: bool,
    },
    /// Give a participant the right to vote
    GiveRight {
        /// Calling identity (must be the chairperson)
        #[arg(short, long)]
        from: String,
        /// Participant receiving the right
        target: String,
    },
    /// Delegate your vote
    Delegate {
        /// Calling identity
        #[arg(short, long)]
        from: String,
        /// Participant to delegate to
        target: String,
    },
    /// Vote for a proposal
    Vote {
        /// Calling identity
        #[arg(short, long)]
        from: String,
        /// Proposal index
        proposal: usize,
    },
    /// Show every proposal and its votes
    ReadVotes,
    /// Show the winning proposal
    Winner,
    /// Show a voter record
    Voter {
        /// Identity to inspect
        address: String,
    },
    /// Show applied operations
    History,
    /// Check the stored ballot's invariants
    Audit,
    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config commands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse an identity: `0x` hex, or an alias hashed into an address.
pub fn parse_identity(input: &str) -> anyhow::Result<Address> {
    let input = input.trim();
    if input.is_empty() {
        bail!("Identity cannot be empty");
    }
    if input.starts_with("0x") || input.starts_with("0X") {
        return input
            .parse()
            .with_context(|| format!("Invalid address '{}'", input));
    }
    Ok(Address::from_seed(input.as_bytes()))
}

/// Run one command against a configuration and state file.
pub fn run(
    command: Commands,
    config: &CliConfig,
    config_path: &std::path::Path,
    state: &StateFile,
) -> anyhow::Result<()> {
    match command {
        Commands::Deploy {
            proposals,
            chairperson,
            force,
        } => {
            if state.exists() && !force {
                bail!(
                    "A ballot already exists at '{}'; pass --force to replace it",
                    state.path().display()
                );
            }
            let chairperson = parse_identity(&chairperson)?;
            let ballot = Ballot::with_config(&proposals, chairperson, config.ballot)?;
            state.save(&ballot)?;
            info!(path = %state.path().display(), "ballot deployed");
            print_success(&format!(
                "Ballot with {} proposals deployed, chairperson {}",
                proposals.len(),
                chairperson
            ));
        }
        Commands::GiveRight { from, target } => {
            let (caller, target) = (parse_identity(&from)?, parse_identity(&target)?);
            let mut ballot = state.load()?;
            ballot.grant_right(caller, target)?;
            state.save(&ballot)?;
            print_success(&format!("Right to vote given to {}", target));
        }
        Commands::Delegate { from, target } => {
            let (caller, target) = (parse_identity(&from)?, parse_identity(&target)?);
            let mut ballot = state.load()?;
            let receipt = ballot.delegate(caller, target)?;
            state.save(&ballot)?;
            if receipt.weight == 0 {
                print_warning("Caller held no weight; nothing was transferred");
            }
            match receipt.outcome {
                DelegationOutcome::Counted { proposal } => print_success(&format!(
                    "Delegated to {}; weight {} counted for proposal {}",
                    receipt.terminus, receipt.weight, proposal
                )),
                DelegationOutcome::Carried { terminus_weight } => print_success(&format!(
                    "Delegated to {}; delegate now holds weight {}",
                    receipt.terminus, terminus_weight
                )),
            }
        }
        Commands::Vote { from, proposal } => {
            let caller = parse_identity(&from)?;
            let mut ballot = state.load()?;
            let weight = ballot.vote(caller, proposal)?;
            state.save(&ballot)?;
            let name = ballot.proposal(proposal)?.name;
            print_success(&format!(
                "Voted for proposal {} ({}) with weight {}",
                proposal, name, weight
            ));
        }
        Commands::ReadVotes => {
            let ballot = state.load()?;
            println!("{}", standings_table(&ballot.standings()));
            print_info(&format!(
                "{} votes counted from {} participants",
                ballot.total_votes(),
                ballot.participants()
            ));
        }
        Commands::Winner => {
            let ballot = state.load()?;
            println!(
                "Winning proposal: {} (#{}) with {} votes",
                ballot.winner_name().to_string().bold(),
                ballot.winning_proposal(),
                ballot.winning_vote_count()
            );
        }
        Commands::Voter { address } => {
            let address = parse_identity(&address)?;
            let ballot = state.load()?;
            let voter = ballot.voter(&address);
            let chain = ballot.resolver().chain(address);
            print_voter(&address, &voter, &chain);
            let delegators = ballot.resolver().delegators_of(&address);
            if !delegators.is_empty() {
                print_info(&format!("{} participants delegated here", delegators.len()));
            }
        }
        Commands::History => {
            let ballot = state.load()?;
            if ballot.events().is_empty() {
                print_info("No operations applied yet");
            }
            for (n, event) in ballot.events().iter().enumerate() {
                println!("{:>4}  {}", n + 1, describe_event(event));
            }
        }
        Commands::Audit => {
            // Loading already audits
            let ballot = state.load()?;
            print_success(&format!(
                "Ballot consistent: {} votes counted, {} participants",
                ballot.total_votes(),
                ballot.participants()
            ));
        }
        Commands::Config(ConfigCommands::Show) => {
            println!("# {}", config_path.display());
            println!("{}", toml::to_string_pretty(config)?);
        }
        Commands::Config(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                bail!(
                    "Config already exists at '{}'; pass --force to overwrite",
                    config_path.display()
                );
            }
            CliConfig::default().save_to(config_path)?;
            print_success(&format!("Configuration written to {}", config_path.display()));
        }
    }
    Ok(())
}
