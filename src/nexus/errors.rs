//! Error types for the in-memory directory boundary.

use crate::model::Dn;

/// Errors raised by [`InMemoryNexus`](crate::nexus::InMemoryNexus) tree
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NexusError {
    /// The named entry (or a required parent) does not exist
    #[error("No such object: {dn}")]
    NoSuchObject { dn: Dn },

    /// An entry already exists at the target name
    #[error("Entry already exists: {dn}")]
    EntryExists { dn: Dn },

    /// Structural operation attempted on an entry with children
    #[error("Entry '{dn}' has children")]
    NotAllowedOnNonLeaf { dn: Dn },

    /// The operation produced an invalid name (e.g. renaming the root)
    #[error("Invalid name for operation: {message}")]
    InvalidName { message: String },
}

impl NexusError {
    /// Create a missing entry error
    pub fn no_such_object(dn: Dn) -> Self {
        Self::NoSuchObject { dn }
    }

    /// Create an existing entry error
    pub fn entry_exists(dn: Dn) -> Self {
        Self::EntryExists { dn }
    }

    /// Create a non-leaf rejection error
    pub fn not_allowed_on_non_leaf(dn: Dn) -> Self {
        Self::NotAllowedOnNonLeaf { dn }
    }

    /// Create an invalid name error
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }
}

pub type NexusResult<T> = Result<T, NexusError>;
