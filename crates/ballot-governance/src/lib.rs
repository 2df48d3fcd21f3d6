//! Ballot Governance - single-chairperson ballot with delegated voting.
//!
//! This crate provides:
//! - Voter rights ledger with chairperson-only grants
//! - Delegation chain resolution with cycle rejection
//! - Proposal tally and winner query (lowest index wins ties)
//! - A lock-guarded handle for concurrent callers

pub mod ballot;
pub mod config;
pub mod delegation;
pub mod error;
pub mod events;
pub mod registry;
pub mod shared;
pub mod tally;

pub use ballot::Ballot;
pub use config::BallotConfig;
pub use delegation::{DelegationOutcome, DelegationReceipt, Resolver};
pub use error::BallotError;
pub use events::BallotEvent;
pub use registry::{Registry, Voter};
pub use shared::SharedBallot;
pub use tally::{Proposal, Standing, Tally};

pub use ballot_types::{Address, ProposalName};
