//! Property-based coverage tests.
//!
//! The central invariant: after any lifecycle operation, an entry carries a
//! subentry's reference exactly when that subentry's specification covers it.
//! These tests generate random trees and random specifications, rebuild the
//! expected reference set from first principles, and diff it against what the
//! interceptor actually wrote.

mod common;

use common::{admin_point, dn, org_unit, setup, subentry};
use proptest::prelude::*;
use std::collections::BTreeSet;
use subentry_server::model::{AUTONOMOUS_AREA_SUBENTRY_AT, Dn, Entry};
use subentry_server::nexus::{DirectoryNexus, InMemoryNexus};
use subentry_server::{Filter, RequestContext, SearchScope, SubentryInterceptor};

const PARENTS: [&str; 3] = ["ou=area", "ou=eng,ou=area", "ou=sales,ou=area"];

/// One generated leaf entry: parent slot, name slot, person-or-device.
#[derive(Debug, Clone)]
struct LeafPlan {
    parent: usize,
    name: usize,
    person: bool,
}

/// One generated subtree specification, kept alongside its textual form so
/// the test exercises the parser with the same value.
#[derive(Debug, Clone)]
struct SpecPlan {
    base: usize,
    minimum: usize,
    maximum: Option<usize>,
    chop_before: Option<usize>,
    chop_after: Option<usize>,
    only_people: bool,
}

impl SpecPlan {
    /// Relative base: slot 0 is the whole area, slots 1/2 name a child ou.
    fn base_rel(&self) -> Dn {
        match self.base {
            1 => dn("ou=eng"),
            2 => dn("ou=sales"),
            _ => Dn::root(),
        }
    }

    fn chop_rel(slot: usize) -> Dn {
        dn(&format!("cn=n{}", slot))
    }

    fn text(&self) -> String {
        let mut parts = Vec::new();
        match self.base {
            1 => parts.push("base \"ou=eng\"".to_string()),
            2 => parts.push("base \"ou=sales\"".to_string()),
            _ => {}
        }
        if self.minimum > 0 {
            parts.push(format!("minimum {}", self.minimum));
        }
        if let Some(maximum) = self.maximum {
            parts.push(format!("maximum {}", maximum));
        }
        let mut exclusions = Vec::new();
        if let Some(slot) = self.chop_before {
            exclusions.push(format!("chopBefore: \"cn=n{}\"", slot));
        }
        if let Some(slot) = self.chop_after {
            exclusions.push(format!("chopAfter: \"cn=n{}\"", slot));
        }
        if !exclusions.is_empty() {
            parts.push(format!("specificExclusions {{ {} }}", exclusions.join(", ")));
        }
        if self.only_people {
            parts.push("specificationFilter item:person".to_string());
        }
        format!("{{ {} }}", parts.join(", "))
    }

    /// First-principles inclusion check, written out independently of the
    /// library's evaluator.
    fn includes(&self, admin_point: &Dn, candidate: &Dn, classes: &BTreeSet<String>) -> bool {
        let base = admin_point.join(&self.base_rel());
        let Some(depth) = candidate.depth_below(&base) else {
            return false;
        };
        if depth < self.minimum {
            return false;
        }
        if let Some(maximum) = self.maximum {
            if depth > maximum {
                return false;
            }
        }
        if let Some(slot) = self.chop_before {
            let excluded = base.join(&Self::chop_rel(slot));
            if candidate.depth_below(&excluded).is_some() {
                return false;
            }
        }
        if let Some(slot) = self.chop_after {
            let excluded = base.join(&Self::chop_rel(slot));
            if candidate.is_descendant_of(&excluded) {
                return false;
            }
        }
        if self.only_people && !classes.contains("person") {
            return false;
        }
        true
    }
}

fn leaf_strategy() -> impl Strategy<Value = LeafPlan> {
    (0..PARENTS.len(), 0..4usize, any::<bool>()).prop_map(|(parent, name, person)| LeafPlan {
        parent,
        name,
        person,
    })
}

fn spec_strategy() -> impl Strategy<Value = SpecPlan> {
    (
        0..3usize,
        0..3usize,
        proptest::option::of(0..4usize),
        proptest::option::of(0..4usize),
        proptest::option::of(0..4usize),
        any::<bool>(),
    )
        .prop_map(
            |(base, minimum, maximum, chop_before, chop_after, only_people)| SpecPlan {
                base,
                minimum,
                maximum,
                chop_before,
                chop_after,
                only_people,
            },
        )
}

fn leaf_entry(plan: &LeafPlan) -> Entry {
    let name = format!("cn=n{},{}", plan.name, PARENTS[plan.parent]);
    let class = if plan.person { "person" } else { "device" };
    Entry::new(dn(&name))
        .with_attribute("objectClass", ["top", class])
        .with_attribute("cn", [format!("n{}", plan.name)])
}

async fn build_area(
    interceptor: &SubentryInterceptor<InMemoryNexus>,
    ctx: &RequestContext,
    leaves: &[LeafPlan],
) {
    interceptor
        .add(admin_point("ou=area", &["autonomousArea"]), ctx)
        .await
        .expect("area admin point");
    interceptor
        .add(org_unit("ou=eng,ou=area"), ctx)
        .await
        .expect("eng ou");
    interceptor
        .add(org_unit("ou=sales,ou=area"), ctx)
        .await
        .expect("sales ou");
    let mut seen = BTreeSet::new();
    for leaf in leaves {
        let entry = leaf_entry(leaf);
        if seen.insert(entry.dn().clone()) {
            interceptor.add(entry, ctx).await.expect("leaf entry");
        }
    }
}

async fn all_entries(nexus: &InMemoryNexus) -> Vec<(Dn, Entry)> {
    nexus
        .search(
            &Dn::root(),
            SearchScope::Subtree,
            &Filter::present("objectClass"),
        )
        .await
        .expect("full tree scan")
}

/// Diff the tree against the expected reference set for one subentry.
async fn assert_coverage(nexus: &InMemoryNexus, spec: &SpecPlan, subentry_dn: &Dn) {
    let admin_point = subentry_dn.parent().expect("subentry has a parent");
    let reference = subentry_dn.to_string();
    for (entry_dn, entry) in all_entries(nexus).await {
        let expected = spec.includes(&admin_point, &entry_dn, &entry.object_classes());
        let actual = entry.has_value(AUTONOMOUS_AREA_SUBENTRY_AT, &reference);
        assert_eq!(
            actual, expected,
            "entry '{}' reference to '{}' (spec {:?})",
            entry_dn, subentry_dn, spec
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Sweep path: the subentry arrives after the tree is populated.
    #[test]
    fn coverage_invariant_after_subentry_add(
        leaves in proptest::collection::vec(leaf_strategy(), 0..8),
        spec in spec_strategy(),
    ) {
        tokio_test::block_on(async {
            let (interceptor, nexus, ctx) = setup();
            build_area(&interceptor, &ctx, &leaves).await;

            let sub = subentry("cn=admin,ou=area", &spec.text());
            interceptor.add(sub, &ctx).await.expect("subentry add");

            assert_coverage(&nexus, &spec, &dn("cn=admin,ou=area")).await;

            // Deleting the subentry strips every reference it created.
            interceptor
                .delete(&dn("cn=admin,ou=area"), &ctx)
                .await
                .expect("subentry delete");
            let reference = "cn=admin,ou=area".to_string();
            for (entry_dn, entry) in all_entries(&nexus).await {
                prop_assert!(
                    !entry.has_value(AUTONOMOUS_AREA_SUBENTRY_AT, &reference),
                    "entry '{}' kept a stale reference",
                    entry_dn
                );
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Seeding path: ordinary entries arrive after the subentry exists.
    #[test]
    fn coverage_invariant_for_seeded_adds(
        leaves in proptest::collection::vec(leaf_strategy(), 0..8),
        spec in spec_strategy(),
    ) {
        tokio_test::block_on(async {
            let (interceptor, nexus, ctx) = setup();
            interceptor
                .add(admin_point("ou=area", &["autonomousArea"]), &ctx)
                .await
                .expect("area admin point");
            interceptor
                .add(org_unit("ou=eng,ou=area"), &ctx)
                .await
                .expect("eng ou");
            interceptor
                .add(org_unit("ou=sales,ou=area"), &ctx)
                .await
                .expect("sales ou");
            interceptor
                .add(subentry("cn=admin,ou=area", &spec.text()), &ctx)
                .await
                .expect("subentry add");

            let mut seen = BTreeSet::new();
            for leaf in &leaves {
                let entry = leaf_entry(leaf);
                if seen.insert(entry.dn().clone()) {
                    interceptor.add(entry, &ctx).await.expect("leaf entry");
                }
            }

            assert_coverage(&nexus, &spec, &dn("cn=admin,ou=area")).await;
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Relocation: moving a leaf between branches re-diffs its references.
    #[test]
    fn coverage_invariant_after_leaf_move(
        leaves in proptest::collection::vec(leaf_strategy(), 1..8),
        spec in spec_strategy(),
        pick in 0..8usize,
    ) {
        tokio_test::block_on(async {
            let (interceptor, nexus, ctx) = setup();
            build_area(&interceptor, &ctx, &leaves).await;
            interceptor
                .add(subentry("cn=admin,ou=area", &spec.text()), &ctx)
                .await
                .expect("subentry add");

            // Pick a leaf that exists and move it to the other branch.
            let leaf = &leaves[pick % leaves.len()];
            let source = dn(&format!("cn=n{},{}", leaf.name, PARENTS[leaf.parent]));
            let target_parent = dn(PARENTS[(leaf.parent + 1) % PARENTS.len()]);
            let target = source.moved_to(&target_parent).expect("leaf has an RDN");
            let occupied = nexus.lookup(&target).await.expect("lookup").is_some();
            if !occupied {
                interceptor
                    .move_entry(&source, &target_parent, None, &ctx)
                    .await
                    .expect("leaf move");
            }

            assert_coverage(&nexus, &spec, &dn("cn=admin,ou=area")).await;
            Ok::<(), TestCaseError>(())
        })?;
    }
}
