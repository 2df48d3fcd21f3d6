//! Voter rights ledger.
//!
//! Records live in an arena addressed by identity -> slot. A record comes
//! into existence the first time an operation mutates it; reads of an
//! unknown identity yield the zero record without registering anything.

use std::collections::HashMap;

use ballot_types::Address;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::BallotError;

/// Per-identity voting state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    /// Accumulated weight; 0 means no right to vote
    pub weight: u64,
    /// Whether this voter's weight has been committed
    pub voted: bool,
    /// Resolved delegate, set when the weight was committed by delegation
    pub delegate: Option<Address>,
    /// Proposal index, set when the voter voted directly
    pub vote: Option<usize>,
}

impl Voter {
    /// The record every unknown identity maps to.
    pub const EMPTY: Self = Self {
        weight: 0,
        voted: false,
        delegate: None,
        vote: None,
    };

    /// Whether the voter holds any weight.
    pub fn has_right(&self) -> bool {
        self.weight > 0
    }

    /// Whether the voter committed its weight by delegating.
    pub fn is_delegating(&self) -> bool {
        self.delegate.is_some()
    }
}

/// Identity and rights ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RegistryState", try_from = "RegistryState")]
pub struct Registry {
    /// Administrator, fixed at construction
    chairperson: Address,
    /// Arena of records in first-reference order
    slots: Vec<(Address, Voter)>,
    /// identity -> arena slot
    index: HashMap<Address, usize>,
    /// Units of weight handed out, the chairperson's included
    rights_granted: u64,
}

impl Registry {
    /// Create a ledger whose chairperson starts with weight 1.
    pub fn new(chairperson: Address) -> Self {
        let mut registry = Self {
            chairperson,
            slots: Vec::new(),
            index: HashMap::new(),
            rights_granted: 1,
        };
        let slot = registry.entry(chairperson);
        registry.slots[slot].1.weight = 1;
        registry
    }

    /// Get the chairperson.
    pub fn chairperson(&self) -> Address {
        self.chairperson
    }

    /// Get a voter record, or the zero record for an unknown identity.
    pub fn lookup(&self, address: &Address) -> Voter {
        self.slot_of(address)
            .map(|slot| self.slots[slot].1)
            .unwrap_or(Voter::EMPTY)
    }

    /// Arena slot of a registered identity.
    pub fn slot_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    /// Record stored at a slot.
    pub fn voter_at(&self, slot: usize) -> Option<&Voter> {
        self.slots.get(slot).map(|(_, voter)| voter)
    }

    /// Number of identities ever registered.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Units of weight granted so far.
    pub fn rights_granted(&self) -> u64 {
        self.rights_granted
    }

    /// Iterate over registered records in first-reference order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Voter)> {
        self.slots.iter().map(|(address, voter)| (address, voter))
    }

    /// Give `target` the right to vote.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the chairperson
    /// - `AlreadyVoted` if `target` already committed its weight
    /// - `AlreadyHasRights` if `target` already holds weight
    pub fn grant_right(&mut self, caller: Address, target: Address) -> Result<(), BallotError> {
        if caller != self.chairperson {
            warn!(%caller, %target, "rejected rights grant from non-chairperson");
            return Err(BallotError::Unauthorized(
                "only the chairperson can give right to vote".to_string(),
            ));
        }

        let current = self.lookup(&target);
        if current.voted {
            return Err(BallotError::AlreadyVoted);
        }
        if current.weight != 0 {
            return Err(BallotError::AlreadyHasRights);
        }
        let granted = self
            .rights_granted
            .checked_add(1)
            .ok_or(BallotError::Overflow)?;

        let slot = self.entry(target);
        self.slots[slot].1.weight = 1;
        self.rights_granted = granted;

        info!(%target, "voting right granted");
        Ok(())
    }

    /// Slot for `address`, registering a zero record on first reference.
    pub(crate) fn entry(&mut self, address: Address) -> usize {
        if let Some(slot) = self.index.get(&address) {
            return *slot;
        }
        let slot = self.slots.len();
        self.slots.push((address, Voter::EMPTY));
        self.index.insert(address, slot);
        slot
    }

    pub(crate) fn voter_mut(&mut self, slot: usize) -> &mut Voter {
        &mut self.slots[slot].1
    }

    /// Store a record verbatim, bypassing every check.
    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, address: Address, voter: Voter) {
        let slot = self.entry(address);
        self.slots[slot].1 = voter;
    }
}

/// Serialized form of [`Registry`]; the index is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryState {
    pub chairperson: Address,
    pub rights_granted: u64,
    pub voters: Vec<(Address, Voter)>,
}

impl From<Registry> for RegistryState {
    fn from(registry: Registry) -> Self {
        Self {
            chairperson: registry.chairperson,
            rights_granted: registry.rights_granted,
            voters: registry.slots,
        }
    }
}

impl TryFrom<RegistryState> for Registry {
    type Error = BallotError;

    fn try_from(state: RegistryState) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(state.voters.len());
        for (slot, (address, _)) in state.voters.iter().enumerate() {
            if index.insert(*address, slot).is_some() {
                return Err(BallotError::CorruptState(format!(
                    "duplicate voter record for {}",
                    address
                )));
            }
        }
        if !index.contains_key(&state.chairperson) {
            return Err(BallotError::CorruptState(
                "chairperson has no voter record".to_string(),
            ));
        }
        Ok(Self {
            chairperson: state.chairperson,
            slots: state.voters,
            index,
            rights_granted: state.rights_granted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address(n: u8) -> Address {
        let mut addr = [0u8; 20];
        addr[19] = n;
        Address::from_bytes(addr)
    }

    #[test]
    fn test_chairperson_starts_with_weight() {
        let chair = test_address(1);
        let registry = Registry::new(chair);

        assert_eq!(registry.chairperson(), chair);
        assert_eq!(registry.lookup(&chair).weight, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rights_granted(), 1);
    }

    #[test]
    fn test_lookup_unknown_is_zero_and_read_only() {
        let registry = Registry::new(test_address(1));

        assert_eq!(registry.lookup(&Address::ZERO), Voter::EMPTY);
        assert_eq!(registry.lookup(&test_address(9)), Voter::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.slot_of(&test_address(9)).is_none());
    }

    #[test]
    fn test_grant_right() {
        let chair = test_address(1);
        let voter = test_address(2);
        let mut registry = Registry::new(chair);

        registry.grant_right(chair, voter).unwrap();
        assert_eq!(registry.lookup(&voter).weight, 1);
        assert!(registry.lookup(&voter).has_right());
        assert_eq!(registry.rights_granted(), 2);

        // Second grant fails and changes nothing
        let before = registry.clone();
        assert_eq!(
            registry.grant_right(chair, voter),
            Err(BallotError::AlreadyHasRights)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_grant_right_requires_chairperson() {
        let chair = test_address(1);
        let outsider = test_address(2);
        let mut registry = Registry::new(chair);

        let result = registry.grant_right(outsider, test_address(3));
        assert!(matches!(result, Err(BallotError::Unauthorized(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_chairperson_cannot_regrant_self() {
        let chair = test_address(1);
        let mut registry = Registry::new(chair);
        assert_eq!(
            registry.grant_right(chair, chair),
            Err(BallotError::AlreadyHasRights)
        );
    }

    #[test]
    fn test_grant_right_to_voted_fails() {
        let chair = test_address(1);
        let voter = test_address(2);
        let mut registry = Registry::new(chair);
        registry.insert_raw(
            voter,
            Voter {
                weight: 0,
                voted: true,
                delegate: Some(chair),
                vote: None,
            },
        );

        assert_eq!(
            registry.grant_right(chair, voter),
            Err(BallotError::AlreadyVoted)
        );
        assert_eq!(registry.lookup(&voter).weight, 0);
    }

    #[test]
    fn test_entry_is_stable() {
        let mut registry = Registry::new(test_address(1));
        let a = registry.entry(test_address(5));
        let b = registry.entry(test_address(5));
        assert_eq!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_state_rebuilds_index() {
        let chair = test_address(1);
        let mut registry = Registry::new(chair);
        registry.grant_right(chair, test_address(2)).unwrap();

        let state = RegistryState::from(registry.clone());
        let rebuilt = Registry::try_from(state).unwrap();
        assert_eq!(rebuilt, registry);
        assert_eq!(rebuilt.slot_of(&test_address(2)), Some(1));
    }

    #[test]
    fn test_state_rejects_duplicates() {
        let chair = test_address(1);
        let state = RegistryState {
            chairperson: chair,
            rights_granted: 1,
            voters: vec![(chair, Voter::EMPTY), (chair, Voter::EMPTY)],
        };
        assert!(matches!(
            Registry::try_from(state),
            Err(BallotError::CorruptState(_))
        ));
    }

    #[test]
    fn test_state_requires_chairperson_record() {
        let state = RegistryState {
            chairperson: test_address(1),
            rights_granted: 1,
            voters: vec![(test_address(2), Voter::EMPTY)],
        };
        assert!(Registry::try_from(state).is_err());
    }
}
