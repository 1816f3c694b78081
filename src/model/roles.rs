//! Administrative role vocabulary.
//!
//! The role vocabulary is closed: an administrative point declares which
//! policy areas it administers through `administrativeRole` values drawn from
//! a fixed set, and each role determines the operational attribute under
//! which covered entries reference the area's subentries. Text outside the
//! vocabulary is a hard constraint violation, never silently ignored.

use crate::error::{SubentryError, SubentryResult};
use serde::{Deserialize, Serialize};

/// Operational attribute referencing autonomous-area subentries.
pub const AUTONOMOUS_AREA_SUBENTRY_AT: &str = "autonomousAreaSubentry";
/// Operational attribute referencing access-control subentries.
pub const ACCESS_CONTROL_SUBENTRIES_AT: &str = "accessControlSubentries";
/// Operational attribute referencing the governing subschema subentry.
pub const SUBSCHEMA_SUBENTRY_AT: &str = "subschemaSubentry";
/// Operational attribute referencing collective-attribute subentries.
pub const COLLECTIVE_ATTRIBUTE_SUBENTRIES_AT: &str = "collectiveAttributeSubentries";

/// Every operational attribute a subentry reference can appear under.
pub const SUBENTRY_OPERATIONAL_ATTRIBUTES: [&str; 4] = [
    AUTONOMOUS_AREA_SUBENTRY_AT,
    ACCESS_CONTROL_SUBENTRIES_AT,
    SUBSCHEMA_SUBENTRY_AT,
    COLLECTIVE_ATTRIBUTE_SUBENTRIES_AT,
];

/// An administrative role carried by an administrative point.
///
/// The inner and specific variants of one policy area share that area's
/// operational attribute; entries do not distinguish which flavor of area
/// covers them, only which subentries do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdministrativeRole {
    AutonomousArea,
    AccessControlSpecificArea,
    AccessControlInnerArea,
    SubschemaAdminSpecificArea,
    CollectiveAttributeSpecificArea,
    CollectiveAttributeInnerArea,
}

impl AdministrativeRole {
    /// Parse a role descriptor, case-insensitively.
    ///
    /// Returns `ConstraintViolation` for any text outside the closed
    /// vocabulary.
    pub fn parse(text: &str) -> SubentryResult<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "autonomousarea" => Ok(Self::AutonomousArea),
            "accesscontrolspecificarea" => Ok(Self::AccessControlSpecificArea),
            "accesscontrolinnerarea" => Ok(Self::AccessControlInnerArea),
            "subschemaadminspecificarea" => Ok(Self::SubschemaAdminSpecificArea),
            "collectiveattributespecificarea" => Ok(Self::CollectiveAttributeSpecificArea),
            "collectiveattributeinnerarea" => Ok(Self::CollectiveAttributeInnerArea),
            _ => Err(SubentryError::constraint_violation(format!(
                "Unrecognized administrative role '{}'",
                text.trim()
            ))),
        }
    }

    /// The canonical descriptor of this role.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::AutonomousArea => "autonomousArea",
            Self::AccessControlSpecificArea => "accessControlSpecificArea",
            Self::AccessControlInnerArea => "accessControlInnerArea",
            Self::SubschemaAdminSpecificArea => "subschemaAdminSpecificArea",
            Self::CollectiveAttributeSpecificArea => "collectiveAttributeSpecificArea",
            Self::CollectiveAttributeInnerArea => "collectiveAttributeInnerArea",
        }
    }

    /// The operational attribute under which covered entries reference this
    /// role's subentries.
    pub fn subentry_attribute(&self) -> &'static str {
        match self {
            Self::AutonomousArea => AUTONOMOUS_AREA_SUBENTRY_AT,
            Self::AccessControlSpecificArea | Self::AccessControlInnerArea => {
                ACCESS_CONTROL_SUBENTRIES_AT
            }
            Self::SubschemaAdminSpecificArea => SUBSCHEMA_SUBENTRY_AT,
            Self::CollectiveAttributeSpecificArea | Self::CollectiveAttributeInnerArea => {
                COLLECTIVE_ATTRIBUTE_SUBENTRIES_AT
            }
        }
    }
}

impl std::fmt::Display for AdministrativeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.descriptor())
    }
}
