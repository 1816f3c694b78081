//! Error types for subentry administration operations.
//!
//! The taxonomy separates validation failures, which are detected before any
//! mutation, from errors surfaced by the directory boundary after the primary
//! write has already been forwarded.

use crate::model::Dn;

/// Main error type for subentry administration operations.
///
/// Covers the validation failures raised by the lifecycle handlers as well as
/// pass-through errors from the directory boundary.
#[derive(Debug, thiserror::Error)]
pub enum SubentryError {
    /// A subtree specification value could not be parsed
    #[error("Invalid attribute syntax for '{value}': {details}")]
    InvalidAttributeSyntax { value: String, details: String },

    /// A required attribute is absent from an entry
    #[error("Entry '{dn}' has no '{attribute}' attribute")]
    NoSuchAttribute { attribute: String, dn: Dn },

    /// An administrative role value lies outside the closed vocabulary
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Attempt to relocate an entry with administrative descendants
    #[error("Entry '{dn}' cannot be relocated: {reason}")]
    NotAllowedOnRdn { dn: Dn, reason: String },

    /// The named entry does not exist in the tree
    #[error("No such object: {dn}")]
    NoSuchObject { dn: Dn },

    /// Malformed distinguished name text
    #[error("Invalid distinguished name: {0}")]
    InvalidDn(#[from] DnParseError),

    /// Errors from the underlying directory boundary
    #[error("Directory boundary error: {0}")]
    Nexus(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised while parsing distinguished name text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnParseError {
    /// An RDN component was empty
    #[error("Empty RDN component in '{dn}'")]
    EmptyComponent { dn: String },

    /// An RDN component lacked the `attribute=value` separator
    #[error("RDN component '{component}' has no '=' separator")]
    MissingSeparator { component: String },

    /// An RDN component had an empty attribute type or value
    #[error("RDN component '{component}' has an empty attribute type or value")]
    EmptyAttributeOrValue { component: String },
}

// Convenience methods for creating common errors
impl SubentryError {
    /// Create an invalid attribute syntax error
    pub fn invalid_syntax(value: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidAttributeSyntax {
            value: value.into(),
            details: details.into(),
        }
    }

    /// Create a missing attribute error
    pub fn no_such_attribute(attribute: impl Into<String>, dn: Dn) -> Self {
        Self::NoSuchAttribute {
            attribute: attribute.into(),
            dn,
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Create a relocation rejection error
    pub fn not_allowed_on_rdn(dn: Dn, reason: impl Into<String>) -> Self {
        Self::NotAllowedOnRdn {
            dn,
            reason: reason.into(),
        }
    }

    /// Create a missing entry error
    pub fn no_such_object(dn: Dn) -> Self {
        Self::NoSuchObject { dn }
    }

    /// Wrap a directory boundary error
    pub fn nexus<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Nexus(Box::new(error))
    }
}

// Result type aliases for convenience
pub type SubentryResult<T> = Result<T, SubentryError>;
pub type DnParseResult<T> = Result<T, DnParseError>;
