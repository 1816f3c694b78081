//! Request context for directory operations.
//!
//! Provides request tracking for logging and auditing purposes, and carries
//! the subentry-visibility signal consumed by list and search handling.

use uuid::Uuid;

/// Request context for directory operations.
///
/// Every operation entering the interceptor carries one of these. The
/// visibility signal defaults to `false`: clients that do not explicitly ask
/// for subentries never see policy objects mixed into ordinary listings.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
    /// Whether the request asked to see subentries in one-level and
    /// subtree-scoped results
    pub subentries_visible: bool,
}

impl RequestContext {
    /// Create a new request context with a specific request ID.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            subentries_visible: false,
        }
    }

    /// Create a new request context with a generated request ID.
    pub fn with_generated_id() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            subentries_visible: false,
        }
    }

    /// Mark the request as asking for subentry visibility.
    pub fn with_subentries_visible(mut self) -> Self {
        self.subentries_visible = true;
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::with_generated_id()
    }
}
