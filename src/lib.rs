#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]
//
// Strategic lint exceptions - these are allowed project-wide for pragmatic reasons:
//
// Documentation lints: Many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Style/complexity: the orchestrator pipeline is naturally one long function;
// breaking it up would hurt readability.
#![allow(clippy::too_many_lines)]
#![allow(clippy::too_many_arguments)]
//
// Performance/ergonomics trade-offs that are acceptable for this codebase:
#![allow(clippy::needless_pass_by_value)] // Queriers take owned queries intentionally
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't need must_use on every method
#![allow(clippy::must_use_candidate)]

//! Engine-agnostic search request normalization.
//!
//! Heterogeneous search requests (HTML forms, API callers, programmatic
//! clients) are translated by pluggable [`FormAdapter`]s into one canonical
//! [`Query`], dispatched to a pluggable [`Querier`] backend, and the raw
//! backend [`Response`] is normalized (facets, pagination, sort metadata)
//! into a uniform envelope by the [`SearchOrchestrator`].

/// The metasearch-core crate version (matches `Cargo.toml`).
pub const METASEARCH_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod field_query;
pub mod form_adapter;
pub mod orchestrator;
pub mod querier;
pub mod types;

pub use error::{Result, SearchError};
pub use field_query::{FilterOperator, OperatorKind, resolve_operator};
pub use form_adapter::{
    ApiFormAdapter, FormAdapter, FormAdapterRegistry, MainFormAdapter, TermResolver,
};
pub use orchestrator::{
    DEFAULT_PER_PAGE, PreDispatchHook, SearchData, SearchOrchestrator, SearchOutcome,
};
pub use querier::{Querier, QuerierError};
pub use types::{
    EngineSettings, FacetSettings, FacetSpec, FacetValueCount, FilterClause, FilterValue,
    FormSettings, Query, Response, ResultItem, SearchConfig, SearchRequest, SiteContext, SortField,
};
