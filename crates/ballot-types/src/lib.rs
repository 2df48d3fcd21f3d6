//! Ballot Types - identity and label types shared by the ballot crates.
//!
//! - Addresses (20-byte participant identities, `0x` hex)
//! - Proposal names (32-byte zero-padded labels)

pub mod address;
pub mod name;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use name::ProposalName;
pub use error::TypesError;
