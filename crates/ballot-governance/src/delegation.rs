//! Delegation chain resolution.
//!
//! A delegation is resolved once, when it is requested: the chain starting
//! at the requested target is followed to its terminus, and the caller's
//! weight is applied there. Nothing between the caller and the terminus is
//! touched, and nothing at all is touched if the walk fails.

use ballot_types::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BallotError;
use crate::registry::Registry;
use crate::tally::Tally;

/// Where a delegated weight ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationOutcome {
    /// Terminus had already voted; the weight was counted for its proposal
    Counted { proposal: usize },
    /// Terminus had not voted; the weight was added to its own
    Carried { terminus_weight: u64 },
}

/// Result of a successful chain walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// First participant in the chain who has not delegated further
    pub terminus: Address,
    /// Delegation links followed past the requested target
    pub hops: usize,
}

/// Read-only chain walker over a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Follow the chain from `target` on behalf of `caller`.
    ///
    /// The walk is bounded by the number of registered participants;
    /// running past the bound is reported the same way as reaching the
    /// caller again.
    pub fn resolve(&self, caller: Address, target: Address) -> Result<Resolution, BallotError> {
        let bound = self.registry.len();
        let mut resolved = target;
        let mut hops = 0usize;

        loop {
            if resolved == caller {
                warn!(%caller, %target, hops, "delegation loop rejected");
                return Err(BallotError::DelegationCycle);
            }

            let next = self
                .registry
                .slot_of(&resolved)
                .and_then(|slot| self.registry.voter_at(slot))
                .and_then(|voter| voter.delegate);

            match next {
                Some(next) => {
                    hops += 1;
                    if hops > bound {
                        warn!(%caller, %target, bound, "delegation walk exceeded participant bound");
                        return Err(BallotError::DelegationCycle);
                    }
                    debug!(hop = hops, from = %resolved, to = %next, "following delegation");
                    resolved = next;
                }
                None => {
                    return Ok(Resolution {
                        terminus: resolved,
                        hops,
                    })
                }
            }
        }
    }

    /// Chain of delegates starting after `from`, ending at its terminus.
    ///
    /// Empty when `from` has not delegated. Stops at the participant bound.
    pub fn chain(&self, from: Address) -> Vec<Address> {
        let mut chain = Vec::new();
        let mut current = from;
        while chain.len() < self.registry.len() {
            match self.registry.lookup(&current).delegate {
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => break,
            }
        }
        chain
    }

    /// Participants whose recorded delegate is `delegate`.
    pub fn delegators_of(&self, delegate: &Address) -> Vec<Address> {
        self.registry
            .iter()
            .filter(|(_, voter)| voter.delegate.as_ref() == Some(delegate))
            .map(|(address, _)| *address)
            .collect()
    }
}

/// Receipt for a resolved delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelegationReceipt {
    pub terminus: Address,
    pub weight: u64,
    pub outcome: DelegationOutcome,
}

/// Delegate `caller`'s weight to `target`, resolving the chain.
///
/// # Errors
/// - `AlreadyVoted` if the caller already committed its weight
/// - `Unauthorized` if `require_weight` is set and the caller holds none
/// - `DelegationCycle` if the chain leads back to the caller
pub fn delegate(
    registry: &mut Registry,
    tally: &mut Tally,
    caller: Address,
    target: Address,
    require_weight: bool,
) -> Result<DelegationReceipt, BallotError> {
    let sender = registry.lookup(&caller);
    if sender.voted {
        return Err(BallotError::AlreadyVoted);
    }
    if require_weight && !sender.has_right() {
        return Err(BallotError::Unauthorized(
            "has no right to delegate".to_string(),
        ));
    }

    let Resolution { terminus, hops } = Resolver::new(registry).resolve(caller, target)?;
    let terminal = registry.lookup(&terminus);

    // Every fallible step happens before the caller is marked.
    let outcome = if terminal.voted {
        let proposal = terminal.vote.ok_or_else(|| {
            BallotError::CorruptState(format!("{} voted without a proposal", terminus))
        })?;
        tally.credit(proposal, sender.weight)?;
        DelegationOutcome::Counted { proposal }
    } else {
        let terminus_weight = terminal
            .weight
            .checked_add(sender.weight)
            .ok_or(BallotError::Overflow)?;
        let slot = registry.entry(terminus);
        registry.voter_mut(slot).weight = terminus_weight;
        DelegationOutcome::Carried { terminus_weight }
    };

    let slot = registry.entry(caller);
    let record = registry.voter_mut(slot);
    record.voted = true;
    record.delegate = Some(terminus);

    info!(%caller, %target, %terminus, hops, weight = sender.weight, ?outcome, "delegation resolved");
    Ok(DelegationReceipt {
        terminus,
        weight: sender.weight,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Voter;
    use ballot_types::ProposalName;

    fn test_address(n: u8) -> Address {
        let mut addr = [0u8; 20];
        addr[19] = n;
        Address::from_bytes(addr)
    }

    fn setup(voters: u8) -> (Registry, Tally) {
        let chair = test_address(1);
        let mut registry = Registry::new(chair);
        for n in 2..=voters {
            registry.grant_right(chair, test_address(n)).unwrap();
        }
        let tally = Tally::new(
            ["a", "b", "c"]
                .iter()
                .map(|n| ProposalName::new(n).unwrap()),
        );
        (registry, tally)
    }

    #[test]
    fn test_delegate_carries_weight() {
        let (mut registry, mut tally) = setup(3);
        let alice = test_address(2);
        let bob = test_address(3);

        let receipt = delegate(&mut registry, &mut tally, alice, bob, false).unwrap();
        assert_eq!(receipt.terminus, bob);
        assert_eq!(receipt.outcome, DelegationOutcome::Carried { terminus_weight: 2 });

        let alice_rec = registry.lookup(&alice);
        assert!(alice_rec.voted);
        assert_eq!(alice_rec.delegate, Some(bob));
        assert_eq!(registry.lookup(&bob).weight, 2);
        assert_eq!(tally.total_votes(), 0);
    }

    #[test]
    fn test_delegate_to_voted_counts_directly() {
        let (mut registry, mut tally) = setup(3);
        let alice = test_address(2);
        let bob = test_address(3);

        tally.cast_vote(&mut registry, bob, 1).unwrap();
        let receipt = delegate(&mut registry, &mut tally, alice, bob, false).unwrap();

        assert_eq!(receipt.outcome, DelegationOutcome::Counted { proposal: 1 });
        assert_eq!(tally.proposal(1).unwrap().vote_count, 2);
        // Terminus weight untouched
        assert_eq!(registry.lookup(&bob).weight, 1);
    }

    #[test]
    fn test_chain_resolves_to_terminus() {
        let (mut registry, mut tally) = setup(4);
        let alice = test_address(2);
        let bob = test_address(3);
        let charlie = test_address(4);

        // Bob -> Charlie, then Alice -> Bob lands on Charlie
        delegate(&mut registry, &mut tally, bob, charlie, false).unwrap();
        let receipt = delegate(&mut registry, &mut tally, alice, bob, false).unwrap();

        assert_eq!(receipt.terminus, charlie);
        assert_eq!(registry.lookup(&alice).delegate, Some(charlie));
        assert_eq!(registry.lookup(&charlie).weight, 3);
        // Intermediate node untouched by the second delegation
        assert_eq!(registry.lookup(&bob).weight, 1);
    }

    #[test]
    fn test_self_delegation_is_cycle() {
        let (mut registry, mut tally) = setup(2);
        let alice = test_address(2);
        let before = registry.clone();

        assert_eq!(
            delegate(&mut registry, &mut tally, alice, alice, false),
            Err(BallotError::DelegationCycle)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let (mut registry, mut tally) = setup(4);
        let alice = test_address(2);
        let bob = test_address(3);
        let charlie = test_address(4);

        // Alice -> Bob -> Charlie
        delegate(&mut registry, &mut tally, bob, charlie, false).unwrap();
        delegate(&mut registry, &mut tally, alice, bob, false).unwrap();

        // Charlie has not voted; delegating to Alice walks Alice -> Charlie
        let before = registry.clone();
        assert_eq!(
            delegate(&mut registry, &mut tally, charlie, alice, false),
            Err(BallotError::DelegationCycle)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_unknown_target_is_its_own_terminus() {
        let (mut registry, mut tally) = setup(2);
        let alice = test_address(2);
        let stranger = test_address(50);

        let receipt = delegate(&mut registry, &mut tally, alice, stranger, false).unwrap();
        assert_eq!(receipt.terminus, stranger);
        assert_eq!(registry.lookup(&stranger).weight, 1);
        assert!(registry.slot_of(&stranger).is_some());
    }

    #[test]
    fn test_zero_weight_delegation_permitted_by_default() {
        let (mut registry, mut tally) = setup(2);
        let nobody = test_address(40);
        let alice = test_address(2);

        let receipt = delegate(&mut registry, &mut tally, nobody, alice, false).unwrap();
        assert_eq!(receipt.weight, 0);
        assert!(registry.lookup(&nobody).voted);
        assert_eq!(registry.lookup(&alice).weight, 1);

        // The one attempt is spent
        assert_eq!(
            delegate(&mut registry, &mut tally, nobody, alice, false),
            Err(BallotError::AlreadyVoted)
        );
    }

    #[test]
    fn test_zero_weight_delegation_rejected_when_required() {
        let (mut registry, mut tally) = setup(2);
        let nobody = test_address(40);

        let result = delegate(&mut registry, &mut tally, nobody, test_address(2), true);
        assert!(matches!(result, Err(BallotError::Unauthorized(_))));
        assert_eq!(registry.lookup(&nobody), Voter::EMPTY);
    }

    #[test]
    fn test_walk_bound_catches_corrupt_loop() {
        let (mut registry, _) = setup(1);
        let x = test_address(10);
        let y = test_address(11);
        let looped = |to| Voter {
            weight: 1,
            voted: true,
            delegate: Some(to),
            vote: None,
        };
        registry.insert_raw(x, looped(y));
        registry.insert_raw(y, looped(x));

        // The loop never reaches the caller, only the bound stops it
        let resolver = Resolver::new(&registry);
        assert_eq!(
            resolver.resolve(test_address(1), x),
            Err(BallotError::DelegationCycle)
        );
        assert!(resolver.chain(x).len() <= registry.len());
    }

    #[test]
    fn test_chain_and_delegators() {
        let (mut registry, mut tally) = setup(4);
        let alice = test_address(2);
        let bob = test_address(3);
        let charlie = test_address(4);

        delegate(&mut registry, &mut tally, bob, charlie, false).unwrap();
        delegate(&mut registry, &mut tally, alice, charlie, false).unwrap();

        let resolver = Resolver::new(&registry);
        assert_eq!(resolver.chain(alice), vec![charlie]);
        assert!(resolver.chain(charlie).is_empty());

        let delegators = resolver.delegators_of(&charlie);
        assert_eq!(delegators.len(), 2);
        assert!(delegators.contains(&alice));
        assert!(delegators.contains(&bob));
    }
}
