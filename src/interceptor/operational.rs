//! Operational attribute computation.
//!
//! Given an administrative point's roles and a subentry's name, derives the
//! operational-attribute values that mark an entry as covered by that
//! subentry, and the modifications that add, strip, or swap such references.
//! The produced value is always the subentry's own distinguished name in
//! string form.

use crate::error::{SubentryError, SubentryResult};
use crate::model::{
    ADMINISTRATIVE_ROLE_AT, AdministrativeRole, Dn, Entry, SUBENTRY_OPERATIONAL_ATTRIBUTES,
};
use crate::nexus::Modification;
use std::collections::BTreeSet;

/// The administrative roles declared by an administrative point.
///
/// A missing or empty `administrativeRole` attribute is `NoSuchAttribute`;
/// role text outside the closed vocabulary is `ConstraintViolation`.
pub fn administrative_roles(admin_point: &Entry) -> SubentryResult<Vec<AdministrativeRole>> {
    let values = admin_point
        .attribute(ADMINISTRATIVE_ROLE_AT)
        .filter(|values| !values.is_empty())
        .ok_or_else(|| {
            SubentryError::no_such_attribute("administrativeRole", admin_point.dn().clone())
        })?;
    values.iter().map(|v| AdministrativeRole::parse(v)).collect()
}

/// The `(attribute, value)` pairs a covered entry carries for a subentry.
///
/// Roles of one policy area deduplicate onto that area's single attribute.
pub fn attributes_for(
    subentry_dn: &Dn,
    roles: &[AdministrativeRole],
) -> Vec<(&'static str, String)> {
    let attributes: BTreeSet<&'static str> =
        roles.iter().map(AdministrativeRole::subentry_attribute).collect();
    attributes
        .into_iter()
        .map(|attribute| (attribute, subentry_dn.to_string()))
        .collect()
}

/// Modifications appending a subentry reference to a covered entry.
///
/// Value-level adds, so an entry already carrying the attribute gains the
/// reference by set union rather than overwrite.
pub fn additions_for(subentry_dn: &Dn, roles: &[AdministrativeRole]) -> Vec<Modification> {
    attributes_for(subentry_dn, roles)
        .into_iter()
        .map(|(attribute, value)| Modification::add(attribute, [value]))
        .collect()
}

/// Modifications stripping a subentry's reference from an entry.
///
/// Only attributes that actually contain the name are touched; an entry
/// without the reference yields no modifications at all.
pub fn removals_for(entry: &Entry, subentry_dn: &Dn) -> Vec<Modification> {
    let value = subentry_dn.to_string();
    SUBENTRY_OPERATIONAL_ATTRIBUTES
        .iter()
        .filter(|attribute| entry.has_value(attribute, &value))
        .map(|attribute| Modification::remove(*attribute, [value.clone()]))
        .collect()
}

/// Modifications swapping a renamed subentry's old name for its new one.
///
/// The single matching value is replaced in place in every attribute that
/// carries it; nothing else in the value set moves.
pub fn replacements_for(entry: &Entry, old_dn: &Dn, new_dn: &Dn) -> Vec<Modification> {
    let old_value = old_dn.to_string();
    let new_value = new_dn.to_string();
    let mut changes = Vec::new();
    for attribute in SUBENTRY_OPERATIONAL_ATTRIBUTES {
        if entry.has_value(attribute, &old_value) {
            changes.push(Modification::remove(attribute, [old_value.clone()]));
            changes.push(Modification::add(attribute, [new_value.clone()]));
        }
    }
    changes
}
