//! Public types exposed by the `metasearch-core` crate.

pub mod query;
pub mod request;
pub mod response;
pub mod settings;

pub use query::{FacetSpec, FilterClause, FilterValue, Query};
pub use request::SearchRequest;
pub use response::{FacetValueCount, Response, ResultItem};
pub use settings::{
    EngineSettings, FacetSettings, FormSettings, SearchConfig, SiteContext, SortField,
};
