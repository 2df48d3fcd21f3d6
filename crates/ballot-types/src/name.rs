use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Fixed-capacity proposal label: UTF-8 text right-padded with zero bytes
/// to 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ProposalName([u8; 32]);

impl ProposalName {
    /// Storage width in bytes.
    pub const CAPACITY: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode a label using the full 32-byte capacity.
    pub fn new(name: &str) -> Result<Self, TypesError> {
        Self::with_limit(name, Self::CAPACITY)
    }

    /// Encode a label, rejecting anything longer than `limit` bytes.
    ///
    /// `limit` is clamped to [`Self::CAPACITY`]. Labels are rejected rather
    /// than truncated so that a stored name always decodes to exactly what
    /// was supplied.
    pub fn with_limit(name: &str, limit: usize) -> Result<Self, TypesError> {
        let max = limit.min(Self::CAPACITY);
        let raw = name.as_bytes();
        if raw.len() > max {
            return Err(TypesError::NameTooLong {
                max,
                actual: raw.len(),
            });
        }
        if raw.contains(&0) {
            return Err(TypesError::NameContainsNul);
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Length of the label without padding.
    pub fn len(&self) -> usize {
        self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the label, stripping the zero padding.
    pub fn as_str(&self) -> Result<&str, TypesError> {
        std::str::from_utf8(&self.0[..self.len()]).map_err(|_| TypesError::NameNotUtf8)
    }

    /// Convert to hex string of the full 32-byte slot, without 0x prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ProposalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Ok(s) => f.write_str(s),
            Err(_) => write!(f, "0x{}", self.to_hex()),
        }
    }
}

impl fmt::Debug for ProposalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProposalName({:?})", self.to_string())
    }
}

impl FromStr for ProposalName {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ProposalName {
    type Error = TypesError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}
