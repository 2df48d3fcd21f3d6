//! Proposal counts, direct votes and the winner query.

use ballot_types::{Address, ProposalName};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BallotError;
use crate::registry::Registry;

/// A ballot proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Short label
    pub name: ProposalName,
    /// Accumulated weight
    pub vote_count: u64,
}

impl Proposal {
    pub fn new(name: ProposalName) -> Self {
        Self {
            name,
            vote_count: 0,
        }
    }
}

/// One row of the current standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub index: usize,
    pub name: ProposalName,
    pub vote_count: u64,
    pub leading: bool,
}

/// Fixed-length proposal sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally {
    proposals: Vec<Proposal>,
}

impl Tally {
    pub fn new(names: impl IntoIterator<Item = ProposalName>) -> Self {
        Self {
            proposals: names.into_iter().map(Proposal::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Get a proposal by index.
    pub fn proposal(&self, index: usize) -> Result<&Proposal, BallotError> {
        self.proposals.get(index).ok_or(BallotError::InvalidProposal {
            index,
            count: self.proposals.len(),
        })
    }

    /// Index of the proposal with the most weight.
    ///
    /// Scans in index order with a strict `>`, so the lowest index wins a
    /// tie and an untouched ballot reports 0.
    pub fn winning_proposal(&self) -> usize {
        let mut winning = 0;
        let mut winning_count = 0u64;
        for (index, proposal) in self.proposals.iter().enumerate() {
            if proposal.vote_count > winning_count {
                winning_count = proposal.vote_count;
                winning = index;
            }
        }
        winning
    }

    /// Vote count of the winning proposal.
    pub fn winning_vote_count(&self) -> u64 {
        self.proposals
            .get(self.winning_proposal())
            .map_or(0, |p| p.vote_count)
    }

    /// Name of the winning proposal.
    pub fn winner_name(&self) -> Option<ProposalName> {
        self.proposals.get(self.winning_proposal()).map(|p| p.name)
    }

    /// Total weight counted across all proposals.
    pub fn total_votes(&self) -> u64 {
        self.proposals
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.vote_count))
    }

    /// Every proposal with its count, in index order.
    pub fn standings(&self) -> Vec<Standing> {
        let winning = self.winning_proposal();
        self.proposals
            .iter()
            .enumerate()
            .map(|(index, p)| Standing {
                index,
                name: p.name,
                vote_count: p.vote_count,
                leading: index == winning,
            })
            .collect()
    }

    /// Add `weight` to a proposal. Fails without touching the count.
    pub(crate) fn credit(&mut self, index: usize, weight: u64) -> Result<u64, BallotError> {
        let count = self.proposals.len();
        let proposal = self
            .proposals
            .get_mut(index)
            .ok_or(BallotError::InvalidProposal { index, count })?;
        let updated = proposal
            .vote_count
            .checked_add(weight)
            .ok_or(BallotError::Overflow)?;
        proposal.vote_count = updated;
        Ok(updated)
    }

    /// Cast `caller`'s whole weight for `proposal`.
    ///
    /// # Errors
    /// - `Unauthorized` if the caller holds no weight
    /// - `AlreadyVoted` if the caller already committed its weight
    /// - `InvalidProposal` if the index is out of range
    pub fn cast_vote(
        &mut self,
        registry: &mut Registry,
        caller: Address,
        proposal: usize,
    ) -> Result<u64, BallotError> {
        let voter = registry.lookup(&caller);
        if !voter.has_right() {
            return Err(BallotError::Unauthorized("has no right to vote".to_string()));
        }
        if voter.voted {
            return Err(BallotError::AlreadyVoted);
        }

        let new_count = self.credit(proposal, voter.weight)?;

        let slot = registry.entry(caller);
        let record = registry.voter_mut(slot);
        record.voted = true;
        record.vote = Some(proposal);

        info!(%caller, proposal, weight = voter.weight, new_count, "vote cast");
        Ok(voter.weight)
    }
}
