//! Journal of applied ballot operations.

use ballot_types::Address;
use serde::{Deserialize, Serialize};

use crate::delegation::DelegationOutcome;

/// An operation that changed ballot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BallotEvent {
    RightGranted {
        target: Address,
    },
    VoteCast {
        voter: Address,
        proposal: usize,
        weight: u64,
    },
    Delegated {
        delegator: Address,
        /// Participant named in the request
        requested: Address,
        /// Where the chain actually ended
        terminus: Address,
        weight: u64,
        outcome: DelegationOutcome,
    },
}

impl BallotEvent {
    /// Participant whose call produced the event.
    pub fn actor(&self) -> Option<Address> {
        match self {
            BallotEvent::RightGranted { .. } => None,
            BallotEvent::VoteCast { voter, .. } => Some(*voter),
            BallotEvent::Delegated { delegator, .. } => Some(*delegator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_tagged() {
        let event = BallotEvent::VoteCast {
            voter: Address::from_bytes([2u8; 20]),
            proposal: 1,
            weight: 3,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["event"], "vote_cast");
        assert_eq!(json["weight"], 3);
    }

    #[test]
    fn test_actor() {
        let who = Address::from_bytes([7u8; 20]);
        let event = BallotEvent::Delegated {
            delegator: who,
            requested: Address::ZERO,
            terminus: Address::ZERO,
            weight: 1,
            outcome: DelegationOutcome::Carried { terminus_weight: 2 },
        };
        assert_eq!(event.actor(), Some(who));
        assert_eq!(BallotEvent::RightGranted { target: who }.actor(), None);
    }
}
