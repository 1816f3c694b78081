//! Subentry and administrative-area maintenance for hierarchical directory
//! services.
//!
//! Subentries are policy objects: each one carries a subtree specification
//! describing which part of an administrative area it governs. This crate
//! keeps every ordinary entry's operational back-references to its covering
//! subentries consistent: a live materialized view over the directory
//! information tree, maintained incrementally under adds, deletes, renames,
//! moves, and modifies.
//!
//! # Core Components
//!
//! - [`SubentryInterceptor`] - Lifecycle handlers wrapping the tree boundary
//! - [`SubtreeCache`] - Live map of subentry names to parsed specifications
//! - [`subtree::evaluate`] - Pure subtree-specification inclusion predicate
//! - [`DirectoryNexus`] - Trait for the underlying tree / pipeline tail
//! - [`VisibilityFilter`] - Hides subentries from ordinary listings
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use subentry_server::{SubentryInterceptor, SubtreeCache};
//! use subentry_server::nexus::InMemoryNexus;
//! use subentry_server::model::Dn;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let nexus = InMemoryNexus::new();
//! let interceptor = SubentryInterceptor::new(nexus, SubtreeCache::new());
//! interceptor.initialize(&[Dn::parse("ou=system")?]).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod interceptor;
pub mod model;
pub mod nexus;
pub mod subtree;

// Re-export commonly used types for convenience
pub use error::{SubentryError, SubentryResult};
pub use interceptor::{SubentryInterceptor, VisibilityFilter};
pub use model::{AdministrativeRole, Dn, Entry, Rdn, RequestContext};
pub use nexus::{
    ChangeOperation, DirectoryNexus, Filter, InMemoryNexus, Modification, NexusError, SearchScope,
};
pub use subtree::{
    Refinement, SubtreeCache, SubtreeSpecification, evaluate, parse_subtree_specification,
};
