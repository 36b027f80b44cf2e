//! The pluggable backend executor.

use thiserror::Error;

use crate::types::{Query, Response};

/// A backend query failure, carrying the backend's human-readable message.
///
/// Transport faults, queries the backend rejects, and backend-side timeouts
/// all surface here. Retry policy, if any, belongs to the querier itself;
/// the orchestrator treats this as fatal for the call.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct QuerierError {
    pub message: String,
}

impl QuerierError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes a [`Query`] against a concrete search backend.
///
/// Implementations live outside the core, must be stateless across calls
/// (concurrent orchestrator calls may share one instance), and must not
/// retain the query past the call.
pub trait Querier: Send + Sync {
    /// Run the query. The single, possibly blocking, backend round trip.
    fn query(&self, query: Query) -> Result<Response, QuerierError>;

    /// Sort keys this backend can actually order by. The orchestrator
    /// intersects these with the configured sort fields.
    fn available_sort_fields(&self) -> Vec<String>;
}
