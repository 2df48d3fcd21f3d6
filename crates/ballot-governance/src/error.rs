use thiserror::Error;

/// Errors that can occur in ballot operations.
///
/// Every variant is a deterministic function of the current state and the
/// caller's input; a failed operation leaves the ballot untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BallotError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Voter already has the right to vote")]
    AlreadyHasRights,

    #[error("Invalid proposal: index {index} out of range (ballot has {count})")]
    InvalidProposal { index: usize, count: usize },

    #[error("Delegation cycle detected")]
    DelegationCycle,

    #[error("Too many proposals: max {max}, got {actual}")]
    TooManyProposals { max: usize, actual: usize },

    #[error("A ballot needs at least one proposal")]
    NoProposals,

    #[error("Invalid proposal name: {0}")]
    InvalidProposalName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Vote weight overflow")]
    Overflow,

    #[error("Corrupt ballot state: {0}")]
    CorruptState(String),
}

impl From<ballot_types::TypesError> for BallotError {
    fn from(e: ballot_types::TypesError) -> Self {
        BallotError::InvalidProposalName(e.to_string())
    }
}
