//! Form adapters: pluggable translators from a raw request shape to a
//! [`Query`].
//!
//! Each adapter understands one request dialect (the main HTML form, the
//! API filter syntax, third-party shapes). Adapters are resolved by name
//! from the stored configuration through a [`FormAdapterRegistry`]; a miss
//! is a first-class error, not a panic. Adapters hold no per-call state, so
//! one instance may serve concurrent calls.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{FormSettings, Query, Response, SearchRequest, SiteContext};

mod api;
mod main_form;

pub use api::ApiFormAdapter;
pub use main_form::MainFormAdapter;

/// Resolves a property term or numeric id to its canonical vocabulary term.
///
/// Implemented outside the core (vocabulary storage is not our concern).
pub trait TermResolver: Send + Sync {
    fn resolve(&self, term_or_id: &str) -> Option<String>;
}

/// Translator from one raw request shape to the canonical query model.
pub trait FormAdapter: Send + Sync {
    /// Short human label for admin screens.
    fn label(&self) -> &'static str;

    /// Setting keys this adapter reads from [`FormSettings`], for config
    /// UIs. Empty when the adapter is not configurable.
    fn config_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Build a [`Query`] from a raw request.
    ///
    /// Malformed filter rows are dropped silently; a shape problem in one
    /// row never fails the whole translation.
    fn to_query(&self, request: &SearchRequest, settings: &FormSettings) -> Query;

    /// Answer a request locally, without a backend call.
    ///
    /// Most adapters cannot, and report a typed failure instead of raising.
    fn to_response(&self, _request: &SearchRequest, _site: Option<&SiteContext>) -> Response {
        Response::failure("Not implemented in this form adapter.")
    }
}

/// Name -> adapter registry. Names come from stored search configurations.
#[derive(Default, Clone)]
pub struct FormAdapterRegistry {
    adapters: HashMap<String, Arc<dyn FormAdapter>>,
}

impl FormAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn FormAdapter>) -> &mut Self {
        self.adapters.insert(name.into(), adapter);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FormAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.adapters.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullAdapter;

    impl FormAdapter for NullAdapter {
        fn label(&self) -> &'static str {
            "Null"
        }

        fn to_query(&self, _request: &SearchRequest, _settings: &FormSettings) -> Query {
            Query::new()
        }
    }

    #[test]
    fn registry_resolves_by_name() {
        let mut registry = FormAdapterRegistry::new();
        registry.register("null", Arc::new(NullAdapter));
        assert!(registry.get("null").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn default_to_response_reports_failure() {
        let response = NullAdapter.to_response(&SearchRequest::new(), None);
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Not implemented in this form adapter.")
        );
    }
}
