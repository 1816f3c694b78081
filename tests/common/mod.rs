//! Shared fixtures for integration tests.

#![allow(dead_code)]

use subentry_server::model::Dn;
use subentry_server::nexus::InMemoryNexus;
use subentry_server::{Entry, RequestContext, SubentryInterceptor, SubtreeCache};

pub fn dn(text: &str) -> Dn {
    Dn::parse(text).expect("test names are well-formed")
}

/// An organizational unit entry named by its leaf value.
pub fn org_unit(name: &str) -> Entry {
    let dn = dn(name);
    let ou = dn.rdn().expect("organizational units are not the root").value().to_string();
    Entry::new(dn)
        .with_attribute("objectClass", ["top", "organizationalUnit"])
        .with_attribute("ou", [ou])
}

/// An administrative point: an organizational unit carrying roles.
pub fn admin_point(name: &str, roles: &[&str]) -> Entry {
    org_unit(name).with_attribute("administrativeRole", roles.iter().copied())
}

/// A person entry named by its leaf value.
pub fn person(name: &str) -> Entry {
    let dn = dn(name);
    let cn = dn.rdn().expect("people are not the root").value().to_string();
    Entry::new(dn)
        .with_attribute("objectClass", ["top", "person"])
        .with_attribute("cn", [cn])
}

/// A subentry carrying the given subtree specification text.
pub fn subentry(name: &str, spec_text: &str) -> Entry {
    let dn = dn(name);
    let cn = dn.rdn().expect("subentries are not the root").value().to_string();
    Entry::new(dn)
        .with_attribute("objectClass", ["top", "subentry"])
        .with_attribute("cn", [cn])
        .with_attribute("subtreeSpecification", [spec_text])
}

/// A fresh interceptor plus a shared handle onto its tree for direct
/// inspection.
pub fn setup() -> (SubentryInterceptor<InMemoryNexus>, InMemoryNexus, RequestContext) {
    let _ = env_logger::builder().is_test(true).try_init();
    let nexus = InMemoryNexus::new();
    let interceptor = SubentryInterceptor::new(nexus.clone(), SubtreeCache::new());
    (interceptor, nexus, RequestContext::with_generated_id())
}

/// The department fixture: an autonomous-area administrative point at
/// `ou=dept` with two people beneath it, plus an unadministered `ou=other`.
pub async fn seed_department(
    interceptor: &SubentryInterceptor<InMemoryNexus>,
    ctx: &RequestContext,
) {
    interceptor
        .add(admin_point("ou=dept", &["autonomousArea"]), ctx)
        .await
        .expect("seeding ou=dept");
    interceptor
        .add(person("cn=alice,ou=dept"), ctx)
        .await
        .expect("seeding alice");
    interceptor
        .add(person("cn=bob,ou=dept"), ctx)
        .await
        .expect("seeding bob");
    interceptor
        .add(org_unit("ou=other"), ctx)
        .await
        .expect("seeding ou=other");
}
