//! The ballot aggregate: proposals, voter ledger and chairperson.

use ballot_types::{Address, ProposalName};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BallotConfig;
use crate::delegation::{self, DelegationReceipt, Resolver};
use crate::error::BallotError;
use crate::events::BallotEvent;
use crate::registry::{Registry, Voter};
use crate::tally::{Proposal, Standing, Tally};

/// A single-chairperson ballot with delegated voting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    config: BallotConfig,
    registry: Registry,
    tally: Tally,
    #[serde(default)]
    events: Vec<BallotEvent>,
}

impl Ballot {
    /// Create a ballot with the default configuration.
    pub fn new<S: AsRef<str>>(names: &[S], chairperson: Address) -> Result<Self, BallotError> {
        Self::with_config(names, chairperson, BallotConfig::default())
    }

    /// Create a ballot.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `NoProposals` for an empty list
    /// - `TooManyProposals` if the list exceeds `max_proposals`
    /// - `InvalidProposalName` if a name exceeds `max_name_len`
    pub fn with_config<S: AsRef<str>>(
        names: &[S],
        chairperson: Address,
        config: BallotConfig,
    ) -> Result<Self, BallotError> {
        config.validate()?;
        if names.is_empty() {
            return Err(BallotError::NoProposals);
        }
        if names.len() > config.max_proposals {
            return Err(BallotError::TooManyProposals {
                max: config.max_proposals,
                actual: names.len(),
            });
        }
        let names = names
            .iter()
            .map(|n| ProposalName::with_limit(n.as_ref(), config.max_name_len))
            .collect::<Result<Vec<_>, _>>()?;

        info!(%chairperson, proposals = names.len(), "ballot created");
        Ok(Self {
            config,
            registry: Registry::new(chairperson),
            tally: Tally::new(names),
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &BallotConfig {
        &self.config
    }

    /// The administrator fixed at construction.
    pub fn chairperson(&self) -> Address {
        self.registry.chairperson()
    }

    /// Give `target` the right to vote. Only the chairperson may call this.
    pub fn grant_right(&mut self, caller: Address, target: Address) -> Result<(), BallotError> {
        self.registry.grant_right(caller, target)?;
        self.events.push(BallotEvent::RightGranted { target });
        Ok(())
    }

    /// Delegate `caller`'s vote to `target`.
    pub fn delegate(
        &mut self,
        caller: Address,
        target: Address,
    ) -> Result<DelegationReceipt, BallotError> {
        let receipt = delegation::delegate(
            &mut self.registry,
            &mut self.tally,
            caller,
            target,
            self.config.require_weight_to_delegate,
        )?;
        self.events.push(BallotEvent::Delegated {
            delegator: caller,
            requested: target,
            terminus: receipt.terminus,
            weight: receipt.weight,
            outcome: receipt.outcome,
        });
        Ok(receipt)
    }

    /// Cast `caller`'s vote for a proposal. Returns the weight counted.
    pub fn vote(&mut self, caller: Address, proposal: usize) -> Result<u64, BallotError> {
        let weight = self.tally.cast_vote(&mut self.registry, caller, proposal)?;
        self.events.push(BallotEvent::VoteCast {
            voter: caller,
            proposal,
            weight,
        });
        Ok(weight)
    }

    /// Voter record for `address`; the zero record if never referenced.
    pub fn voter(&self, address: &Address) -> Voter {
        self.registry.lookup(address)
    }

    /// Get a proposal by index.
    pub fn proposal(&self, index: usize) -> Result<&Proposal, BallotError> {
        self.tally.proposal(index)
    }

    pub fn proposals(&self) -> &[Proposal] {
        self.tally.proposals()
    }

    /// Index of the leading proposal; lowest index on ties.
    pub fn winning_proposal(&self) -> usize {
        self.tally.winning_proposal()
    }

    /// Name of the leading proposal.
    pub fn winner_name(&self) -> ProposalName {
        // A ballot always holds at least one proposal
        self.tally.winner_name().unwrap_or_default()
    }

    pub fn winning_vote_count(&self) -> u64 {
        self.tally.winning_vote_count()
    }

    pub fn total_votes(&self) -> u64 {
        self.tally.total_votes()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.tally.standings()
    }

    /// Number of identities the ballot has recorded.
    pub fn participants(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry)
    }

    /// Applied operations, oldest first.
    pub fn events(&self) -> &[BallotEvent] {
        &self.events
    }

    /// Re-check every ballot invariant over the full state.
    ///
    /// Returns `CorruptState` naming the first violation found.
    pub fn audit(&self) -> Result<(), BallotError> {
        let corrupt = |msg: String| Err(BallotError::CorruptState(msg));

        if self.tally.is_empty() {
            return corrupt("ballot has no proposals".to_string());
        }
        if self.tally.len() > self.config.max_proposals {
            return corrupt(format!(
                "{} proposals exceed capacity {}",
                self.tally.len(),
                self.config.max_proposals
            ));
        }

        let chair = self.registry.lookup(&self.chairperson());
        if chair.weight == 0 {
            return corrupt("chairperson holds no weight".to_string());
        }

        let resolver = self.resolver();
        let mut uncommitted: u64 = 0;
        for (address, voter) in self.registry.iter() {
            match (voter.voted, voter.vote, voter.delegate) {
                (false, None, None) => {
                    uncommitted = uncommitted
                        .checked_add(voter.weight)
                        .ok_or(BallotError::Overflow)?;
                }
                (true, Some(index), None) => {
                    if index >= self.tally.len() {
                        return corrupt(format!("{} voted for missing proposal {}", address, index));
                    }
                    if voter.weight == 0 {
                        return corrupt(format!("{} voted without weight", address));
                    }
                }
                (true, None, Some(delegate)) => {
                    if self.registry.slot_of(&delegate).is_none() {
                        return corrupt(format!("{} delegated to unknown {}", address, delegate));
                    }
                    if resolver.resolve(*address, delegate).is_err() {
                        return corrupt(format!("delegation from {} does not terminate", address));
                    }
                }
                _ => {
                    return corrupt(format!("{} has inconsistent vote fields", address));
                }
            }
        }

        let counted = self.tally.total_votes();
        let held = counted.checked_add(uncommitted).ok_or(BallotError::Overflow)?;
        if held != self.registry.rights_granted() {
            return corrupt(format!(
                "weight not conserved: {} counted + {} uncommitted != {} granted",
                counted,
                uncommitted,
                self.registry.rights_granted()
            ));
        }

        Ok(())
    }
}
