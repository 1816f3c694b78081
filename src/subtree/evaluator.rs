//! Subtree specification evaluation.
//!
//! The inclusion predicate at the core of subentry administration. This is
//! the hot path of every corrective sweep: it is invoked once per candidate
//! entry, performs no I/O, and its cost is linear in the candidate's depth.

use crate::model::Dn;
use crate::subtree::spec::SubtreeSpecification;
use std::collections::BTreeSet;

/// Decide whether a candidate entry falls under a subtree specification.
///
/// The candidate is included when all of the following hold:
///
/// - it lies within `admin_point + spec.base` (the base node itself counts,
///   at depth 0);
/// - its depth below the base falls within `[minimum, maximum]`, an absent
///   maximum being unbounded;
/// - it is not equal to or beneath any `chop_before` exclusion, and not
///   strictly beneath any `chop_after` exclusion;
/// - the refinement, when present, is satisfied by its object classes.
///
/// Pure and deterministic for given inputs.
pub fn evaluate(
    spec: &SubtreeSpecification,
    admin_point: &Dn,
    candidate: &Dn,
    candidate_classes: &BTreeSet<String>,
) -> bool {
    let base = admin_point.join(&spec.base);
    let Some(depth) = candidate.depth_below(&base) else {
        return false;
    };

    if depth < spec.minimum {
        return false;
    }
    if spec.maximum.is_some_and(|maximum| depth > maximum) {
        return false;
    }

    // chopBefore excludes the named node and everything beneath it;
    // chopAfter keeps the node and excludes only its descendants.
    for chop in &spec.chop_before {
        if candidate.depth_below(&base.join(chop)).is_some() {
            return false;
        }
    }
    for chop in &spec.chop_after {
        if candidate.is_descendant_of(&base.join(chop)) {
            return false;
        }
    }

    match &spec.refinement {
        Some(refinement) => refinement.matches(candidate_classes),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtree::spec::Refinement;

    fn dn(text: &str) -> Dn {
        Dn::parse(text).unwrap()
    }

    fn classes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_whole_area_includes_base_and_descendants() {
        let spec = SubtreeSpecification::whole_area();
        let ap = dn("ou=dept,ou=system");
        let people = classes(&["person"]);

        assert!(evaluate(&spec, &ap, &ap, &people));
        assert!(evaluate(&spec, &ap, &dn("cn=alice,ou=dept,ou=system"), &people));
        assert!(evaluate(
            &spec,
            &ap,
            &dn("cn=x,cn=alice,ou=dept,ou=system"),
            &people
        ));
        assert!(!evaluate(&spec, &ap, &dn("cn=alice,ou=other,ou=system"), &people));
        assert!(!evaluate(&spec, &ap, &dn("ou=system"), &people));
    }

    #[test]
    fn test_base_offsets_the_scope() {
        let spec = SubtreeSpecification::whole_area().with_base(dn("ou=people"));
        let ap = dn("ou=dept");
        let people = classes(&["person"]);

        assert!(evaluate(&spec, &ap, &dn("ou=people,ou=dept"), &people));
        assert!(evaluate(&spec, &ap, &dn("cn=alice,ou=people,ou=dept"), &people));
        assert!(!evaluate(&spec, &ap, &ap, &people));
        assert!(!evaluate(&spec, &ap, &dn("cn=alice,ou=dept"), &people));
    }

    #[test]
    fn test_depth_bounds() {
        let spec = SubtreeSpecification::whole_area().with_bounds(1, Some(2));
        let ap = dn("ou=dept");
        let people = classes(&["person"]);

        assert!(!evaluate(&spec, &ap, &ap, &people));
        assert!(evaluate(&spec, &ap, &dn("cn=a,ou=dept"), &people));
        assert!(evaluate(&spec, &ap, &dn("cn=b,cn=a,ou=dept"), &people));
        assert!(!evaluate(&spec, &ap, &dn("cn=c,cn=b,cn=a,ou=dept"), &people));
    }

    #[test]
    fn test_chop_before_excludes_node_and_subtree() {
        let spec = SubtreeSpecification::whole_area().with_chop_before(dn("cn=hidden"));
        let ap = dn("ou=dept");
        let people = classes(&["person"]);

        assert!(!evaluate(&spec, &ap, &dn("cn=hidden,ou=dept"), &people));
        assert!(!evaluate(&spec, &ap, &dn("cn=x,cn=hidden,ou=dept"), &people));
        assert!(evaluate(&spec, &ap, &dn("cn=visible,ou=dept"), &people));
    }

    #[test]
    fn test_chop_after_keeps_node_excludes_descendants() {
        let spec = SubtreeSpecification::whole_area().with_chop_after(dn("cn=archive"));
        let ap = dn("ou=dept");
        let people = classes(&["person"]);

        assert!(evaluate(&spec, &ap, &dn("cn=archive,ou=dept"), &people));
        assert!(!evaluate(&spec, &ap, &dn("cn=x,cn=archive,ou=dept"), &people));
        assert!(evaluate(&spec, &ap, &dn("cn=other,ou=dept"), &people));
    }

    #[test]
    fn test_refinement_filters_by_class() {
        let spec = SubtreeSpecification::whole_area()
            .with_refinement(Refinement::item("person"));
        let ap = dn("ou=dept");

        assert!(evaluate(&spec, &ap, &dn("cn=alice,ou=dept"), &classes(&["person", "top"])));
        assert!(!evaluate(&spec, &ap, &dn("cn=printer,ou=dept"), &classes(&["device", "top"])));
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let spec = SubtreeSpecification::whole_area()
            .with_bounds(0, Some(5))
            .with_chop_before(dn("cn=hidden"))
            .with_refinement(Refinement::item("person"));
        let ap = dn("ou=dept");
        let candidate = dn("cn=alice,ou=dept");
        let cls = classes(&["person"]);

        let first = evaluate(&spec, &ap, &candidate, &cls);
        for _ in 0..10 {
            assert_eq!(evaluate(&spec, &ap, &candidate, &cls), first);
        }
    }
}
