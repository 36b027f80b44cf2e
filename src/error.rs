//! Error types shared across the crate.

use thiserror::Error;

use crate::querier::QuerierError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that terminate a search call early.
///
/// Malformed filter rows are never surfaced here; adapters drop them
/// silently and keep going (partial well-formed input is the common case).
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search configuration names a form adapter nobody registered.
    #[error("Form adapter \"{name}\" not found.")]
    AdapterNotFound { name: String },

    /// The backend rejected or failed the query.
    #[error(transparent)]
    Querier(#[from] QuerierError),
}
