//! Subentry visibility filtering.
//!
//! Subentries are policy objects, not ordinary data; one-level and subtree
//! reads hide them unless the request explicitly asks to see them.
//! Object-scope reads are never filtered, so a subentry addressed directly by
//! name always resolves.

use crate::model::{Dn, Entry, RequestContext};
use crate::nexus::SearchScope;

/// Lazy post-filter over search and list results.
///
/// Wraps any `(Dn, Entry)` iterator and drops subentry results according to
/// the request's scope and visibility signal. Without an explicit signal the
/// filter hides subentries, so clients that don't ask never see policy
/// objects mixed into ordinary listings.
#[derive(Debug)]
pub struct VisibilityFilter<I> {
    inner: I,
    scope: SearchScope,
    subentries_visible: bool,
}

impl<I> VisibilityFilter<I>
where
    I: Iterator<Item = (Dn, Entry)>,
{
    /// Wrap a result stream for the given scope and request context.
    pub fn wrap(inner: I, scope: SearchScope, ctx: &RequestContext) -> Self {
        Self {
            inner,
            scope,
            subentries_visible: ctx.subentries_visible,
        }
    }

    fn retains(&self, entry: &Entry) -> bool {
        self.subentries_visible || self.scope == SearchScope::Object || !entry.is_subentry()
    }
}

impl<I> Iterator for VisibilityFilter<I>
where
    I: Iterator<Item = (Dn, Entry)>,
{
    type Item = (Dn, Entry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (dn, entry) = self.inner.next()?;
            if self.retains(&entry) {
                return Some((dn, entry));
            }
        }
    }
}
