//! Output formatting utilities.
//!
//! Pretty printing for CLI commands.

use ballot_governance::{BallotEvent, DelegationOutcome, Standing, Voter};
use ballot_types::Address;
use colored::Colorize;
use tabled::{Table, Tabled};

/// Format address for display.
pub fn format_address(addr: &Address) -> String {
    format_address_short(&addr.to_string())
}

/// Format address (short version).
pub fn format_address_short(addr: &str) -> String {
    if addr.len() > 12 {
        format!("{}...{}", &addr[..10], &addr[addr.len() - 8..])
    } else {
        addr.to_string()
    }
}

/// Print success message.
pub fn print_success(msg: &str) {
    println!("{}", format!("✓ {}", msg).green());
}

/// Print error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", format!("✗ {}", msg).red());
}

/// Print warning message.
pub fn print_warning(msg: &str) {
    println!("{}", format!("⚠ {}", msg).yellow());
}

/// Print info message.
pub fn print_info(msg: &str) {
    println!("{}", format!("ℹ {}", msg).blue());
}

#[derive(Tabled)]
struct StandingRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Proposal")]
    name: String,
    #[tabled(rename = "Votes")]
    votes: u64,
    #[tabled(rename = "")]
    marker: &'static str,
}

/// Render the proposal table.
pub fn standings_table(rows: &[Standing]) -> String {
    let rows = rows.iter().map(|s| StandingRow {
        index: s.index,
        name: s.name.to_string(),
        votes: s.vote_count,
        marker: if s.leading { "leading" } else { "" },
    });
    Table::new(rows).to_string()
}

/// Print a voter record with its delegation chain.
pub fn print_voter(address: &Address, voter: &Voter, chain: &[Address]) {
    println!("{}", "Voter".bold());
    println!("  Address:  {}", address);
    println!("  Weight:   {}", voter.weight);
    println!("  Voted:    {}", if voter.voted { "yes".green() } else { "no".yellow() });
    if let Some(proposal) = voter.vote {
        println!("  Vote:     proposal {}", proposal);
    }
    if let Some(delegate) = voter.delegate {
        println!("  Delegate: {}", delegate);
    }
    if !chain.is_empty() {
        let hops: Vec<String> = chain.iter().map(format_address).collect();
        println!("  Chain:    {}", hops.join(" -> "));
    }
}

/// One-line description of a journal entry.
pub fn describe_event(event: &BallotEvent) -> String {
    match event {
        BallotEvent::RightGranted { target } => {
            format!("right granted to {}", format_address(target))
        }
        BallotEvent::VoteCast {
            voter,
            proposal,
            weight,
        } => format!(
            "{} voted for proposal {} with weight {}",
            format_address(voter),
            proposal,
            weight
        ),
        BallotEvent::Delegated {
            delegator,
            terminus,
            weight,
            outcome,
            ..
        } => {
            let landed = match outcome {
                DelegationOutcome::Counted { proposal } => {
                    format!("counted for proposal {}", proposal)
                }
                DelegationOutcome::Carried { terminus_weight } => {
                    format!("delegate now holds {}", terminus_weight)
                }
            };
            format!(
                "{} delegated weight {} to {} ({})",
                format_address(delegator),
                weight,
                format_address(terminus),
                landed
            )
        }
    }
}
