//! Ballot construction parameters.

use ballot_types::ProposalName;
use serde::{Deserialize, Serialize};

use crate::error::BallotError;

/// Default proposal capacity of a ballot.
pub const DEFAULT_MAX_PROPOSALS: usize = 5;

/// Ballot configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    /// Maximum number of proposals accepted at construction
    pub max_proposals: usize,
    /// Maximum proposal name length in bytes (at most 32)
    pub max_name_len: usize,
    /// Reject delegation from participants holding no weight
    pub require_weight_to_delegate: bool,
}

impl Default for BallotConfig {
    fn default() -> Self {
        Self {
            max_proposals: DEFAULT_MAX_PROPOSALS,
            max_name_len: ProposalName::CAPACITY,
            require_weight_to_delegate: false,
        }
    }
}

impl BallotConfig {
    /// Set the proposal capacity.
    pub fn with_max_proposals(mut self, max: usize) -> Self {
        self.max_proposals = max;
        self
    }

    /// Set the proposal name limit.
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }

    /// Require a positive weight to delegate.
    pub fn strict_delegation(mut self) -> Self {
        self.require_weight_to_delegate = true;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), BallotError> {
        if self.max_proposals == 0 {
            return Err(BallotError::InvalidConfig(
                "max_proposals cannot be 0".to_string(),
            ));
        }
        if self.max_name_len == 0 || self.max_name_len > ProposalName::CAPACITY {
            return Err(BallotError::InvalidConfig(format!(
                "max_name_len must be within 1..={}, got {}",
                ProposalName::CAPACITY,
                self.max_name_len
            )));
        }
        Ok(())
    }
}
