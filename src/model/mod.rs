//! Core data model: distinguished names, entries, administrative roles, and
//! request context.

pub mod context;
pub mod dn;
pub mod entry;
pub mod roles;

pub use context::RequestContext;
pub use dn::{Dn, Rdn};
pub use entry::{
    ADMINISTRATIVE_ROLE_AT, Entry, OBJECT_CLASS_AT, SUBENTRY_OC, SUBENTRY_OC_OID,
    SUBTREE_SPECIFICATION_AT,
};
pub use roles::{
    ACCESS_CONTROL_SUBENTRIES_AT, AUTONOMOUS_AREA_SUBENTRY_AT, AdministrativeRole,
    COLLECTIVE_ATTRIBUTE_SUBENTRIES_AT, SUBENTRY_OPERATIONAL_ATTRIBUTES, SUBSCHEMA_SUBENTRY_AT,
};
