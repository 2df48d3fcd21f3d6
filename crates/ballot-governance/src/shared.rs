//! Thread-safe ballot handle.
//!
//! Mutations hold the write lock for the whole operation, so readers never
//! observe a half-applied delegation.

use std::sync::Arc;

use ballot_types::{Address, ProposalName};
use parking_lot::RwLock;

use crate::ballot::Ballot;
use crate::delegation::DelegationReceipt;
use crate::error::BallotError;
use crate::registry::Voter;
use crate::tally::{Proposal, Standing};

/// Cloneable handle to a ballot shared between threads.
#[derive(Debug, Clone)]
pub struct SharedBallot {
    inner: Arc<RwLock<Ballot>>,
}

impl SharedBallot {
    pub fn new(ballot: Ballot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ballot)),
        }
    }

    pub fn grant_right(&self, caller: Address, target: Address) -> Result<(), BallotError> {
        self.inner.write().grant_right(caller, target)
    }

    pub fn delegate(&self, caller: Address, target: Address) -> Result<DelegationReceipt, BallotError> {
        self.inner.write().delegate(caller, target)
    }

    pub fn vote(&self, caller: Address, proposal: usize) -> Result<u64, BallotError> {
        self.inner.write().vote(caller, proposal)
    }

    pub fn voter(&self, address: &Address) -> Voter {
        self.inner.read().voter(address)
    }

    pub fn proposal(&self, index: usize) -> Result<Proposal, BallotError> {
        self.inner.read().proposal(index).copied()
    }

    pub fn winning_proposal(&self) -> usize {
        self.inner.read().winning_proposal()
    }

    pub fn winner_name(&self) -> ProposalName {
        self.inner.read().winner_name()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.inner.read().standings()
    }

    /// Consistent copy of the whole ballot.
    pub fn snapshot(&self) -> Ballot {
        self.inner.read().clone()
    }

    /// Run a read-only closure against one consistent view.
    pub fn with_read<R>(&self, f: impl FnOnce(&Ballot) -> R) -> R {
        f(&*self.inner.read())
    }
}

impl From<Ballot> for SharedBallot {
    fn from(ballot: Ballot) -> Self {
        Self::new(ballot)
    }
}
