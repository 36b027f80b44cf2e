//! Request orchestration for `metasearch-core`.
//!
//! One call runs the whole pipeline on the calling thread: resolve the
//! configured form adapter, clean the raw request, build the query, layer
//! in visibility, site scope, resource types, sort, pagination and facets,
//! run the pre-dispatch hook once, dispatch to the querier, and normalize
//! the response into a success or error envelope. Two outcomes terminate
//! early (adapter missing, backend failure); nothing is retried here.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Result, SearchError};
use crate::form_adapter::FormAdapterRegistry;
use crate::querier::{Querier, QuerierError};
use crate::types::{
    EngineSettings, Query, Response, SearchConfig, SearchRequest, SiteContext, SortField,
};

/// Roles that may see private content. Anything else, including an absent
/// role, leaves the query at the backend default (public only).
const PRIVILEGED_ROLES: [&str; 6] = [
    "global_admin",
    "site_admin",
    "editor",
    "reviewer",
    "author",
    "researcher",
];

/// Request keys that never count as search constraints when deciding
/// whether a request is empty.
const NON_CONSTRAINT_KEYS: [&str; 8] = [
    "page",
    "per_page",
    "limit",
    "offset",
    "sort_by",
    "sort_order",
    "resource-type",
    "sort",
];

/// Non-semantic keys stripped before anything looks at the request.
const NON_SEMANTIC_KEYS: [&str; 2] = ["csrf", "submit"];

/// Global page-size fallback when neither the request nor the site
/// settings provide one.
pub const DEFAULT_PER_PAGE: u64 = 25;

/// Pre-dispatch extension point: receives the cleaned request and the fully
/// augmented query, returns the query to dispatch. Runs exactly once per
/// call.
pub type PreDispatchHook = Box<dyn Fn(&SearchRequest, Query) -> Query + Send + Sync>;

/// The uniform result envelope handed to the presentation layer.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    Success { data: SearchData },
    Error { message: String },
}

/// Success payload: everything a presentation layer needs to render the
/// result list, pagination, and sort selector.
#[derive(Debug, Clone, Serialize)]
pub struct SearchData {
    pub site: Option<SiteContext>,
    pub query: Query,
    pub response: Response,
    /// Configured sort fields the backend actually supports, config order.
    pub sort_options: Vec<SortField>,
    /// Max across the searched resource types' totals; the types share one
    /// paginated list, so the sum would overshoot.
    pub total_results: u64,
    pub page: u64,
}

/// Turns raw requests into result envelopes. Stateless across calls;
/// concurrent calls need no synchronization.
pub struct SearchOrchestrator {
    adapters: FormAdapterRegistry,
    default_per_page: u64,
    pre_dispatch: Option<PreDispatchHook>,
}

impl SearchOrchestrator {
    pub fn new(adapters: FormAdapterRegistry) -> Self {
        Self {
            adapters,
            default_per_page: DEFAULT_PER_PAGE,
            pre_dispatch: None,
        }
    }

    pub fn with_default_per_page(mut self, per_page: u64) -> Self {
        self.default_per_page = per_page.max(1);
        self
    }

    pub fn with_pre_dispatch(mut self, hook: PreDispatchHook) -> Self {
        self.pre_dispatch = Some(hook);
        self
    }

    /// Handle one search call end to end.
    pub fn handle(
        &self,
        request: &SearchRequest,
        config: &SearchConfig,
        engine: &EngineSettings,
        querier: &dyn Querier,
        site: Option<&SiteContext>,
        role: Option<&str>,
    ) -> SearchOutcome {
        match self.run(request, config, engine, querier, site, role) {
            Ok(data) => SearchOutcome::Success { data },
            Err(err) => SearchOutcome::Error {
                message: err.to_string(),
            },
        }
    }

    fn run(
        &self,
        request: &SearchRequest,
        config: &SearchConfig,
        engine: &EngineSettings,
        querier: &dyn Querier,
        site: Option<&SiteContext>,
        role: Option<&str>,
    ) -> Result<SearchData> {
        let Some(adapter) = self.adapters.get(&config.form_adapter) else {
            let err = SearchError::AdapterNotFound {
                name: config.form_adapter.clone(),
            };
            error!("{err}");
            return Err(err);
        };

        let (mut request, is_empty) = clean_request(request);
        if is_empty {
            // Unconstrained listing: keep the pagination/sort/facet
            // arguments and ask for everything.
            request.insert("search", Value::String("*".into()));
        }

        let mut query = adapter.to_query(&request, &config.form);

        if role.is_some_and(|role| PRIVILEGED_ROLES.contains(&role)) {
            query.set_is_public(false);
        }

        if let Some(site) = site {
            query.set_site_id(site.id);
        }

        match request.get("resource-type") {
            Some(value) => {
                query.set_resources(string_list(value));
            }
            None => {
                query.set_resources(engine.resources.clone());
            }
        }

        // Sort is only re-validated when the adapter set one; an adapter
        // that leaves it unset owns its own ordering (the API adapter).
        let sort_options = sort_options(config, querier);
        if query.sort.is_some() {
            query.sort = request
                .string_value("sort")
                .filter(|name| sort_options.iter().any(|field| field.name == *name))
                .or_else(|| sort_options.first().map(|field| field.name.clone()));
        }

        let page = request.positive_int("page").unwrap_or(1);
        let per_page = request
            .positive_int("per_page")
            .or_else(|| site.and_then(|site| site.per_page))
            .unwrap_or(self.default_per_page);
        query.set_limit_page(page, per_page);

        let has_facets = !config.facet.facets.is_empty();
        if has_facets {
            query.add_facet_fields(config.facet.facets.iter().cloned());
            if let Some(limit) = config.facet.limit {
                query.set_facet_limit(limit);
            }
            if let Some(order) = &config.facet.order {
                query.set_facet_order(order.clone());
            }
            if !config.facet.languages.is_empty() {
                query.set_facet_languages(config.facet.languages.clone());
            }
            if let Some(Value::Object(active)) = request.get("facet") {
                for (name, values) in active {
                    for value in string_list(values) {
                        query.add_active_facet(name.clone(), value);
                    }
                }
            }
        }

        if let Some(hook) = &self.pre_dispatch {
            query = hook(&request, query);
        }

        debug!(
            adapter = adapter.label(),
            page,
            per_page,
            "dispatching search query"
        );

        let mut response = match querier.query(query.clone()) {
            Ok(response) => response,
            Err(backend) => {
                let serialized = serde_json::to_string_pretty(&query)
                    .unwrap_or_else(|_| "<unserializable>".to_string());
                let message = format!("Query error: {backend}\nQuery: {serialized}");
                error!("{message}");
                return Err(SearchError::Querier(QuerierError::new(message)));
            }
        };

        if has_facets {
            // Keep only declared facet fields, in declared order.
            let filtered: Vec<_> = config
                .facet
                .facets
                .iter()
                .filter_map(|field| {
                    response
                        .facet_counts
                        .iter()
                        .find(|(name, _)| name == field)
                        .map(|(_, counts)| (field.clone(), counts.clone()))
                })
                .collect();
            response.set_facet_counts(filtered);
        }

        let total_results = query
            .resources
            .iter()
            .map(|resource| response.total_for(resource))
            .max()
            .unwrap_or(0);

        Ok(SearchData {
            site: site.cloned(),
            query,
            response,
            sort_options,
            total_results,
            page,
        })
    }
}

/// Configured sort fields the backend reports as available, config order
/// preserved.
fn sort_options(config: &SearchConfig, querier: &dyn Querier) -> Vec<SortField> {
    if config.sort_fields.is_empty() {
        return Vec::new();
    }
    let available = querier.available_sort_fields();
    config
        .sort_fields
        .iter()
        .filter(|field| available.contains(&field.name))
        .cloned()
        .collect()
}

/// Strip non-semantic keys and recursively drop empty values, then report
/// whether any search constraint remains.
fn clean_request(request: &SearchRequest) -> (SearchRequest, bool) {
    let mut cleaned = request.clone();
    for key in NON_SEMANTIC_KEYS {
        cleaned.remove(key);
    }
    cleaned.as_map_mut().retain(|_, value| prune(value));

    let is_empty = !cleaned
        .keys()
        .any(|key| !NON_CONSTRAINT_KEYS.contains(&key.as_str()));
    (cleaned, is_empty)
}

/// Whether `value` carries anything. Blank strings and transitively empty
/// containers do not; `false` and `0` are semantic tri-state inputs and do.
fn prune(value: &mut Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(entries) => {
            entries.retain_mut(prune);
            !entries.is_empty()
        }
        Value::Object(map) => {
            map.retain(|_, entry| prune(entry));
            !map.is_empty()
        }
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Normalize a scalar-or-array value into a list of strings.
fn string_list(value: &Value) -> Vec<String> {
    let entries: Vec<&Value> = match value {
        Value::Array(entries) => entries.iter().collect(),
        other => vec![other],
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> SearchRequest {
        SearchRequest::from_value(value)
    }

    #[test]
    fn cleaning_strips_csrf_and_empty_values() {
        let (cleaned, _) = clean_request(&request(json!({
            "csrf": "token",
            "submit": "Search",
            "search": "tree",
            "blank": "   ",
            "nested": {"inner": "", "deep": {"also": []}},
            "list": ["", "kept"],
        })));
        assert_eq!(cleaned.get("search"), Some(&json!("tree")));
        assert!(cleaned.get("csrf").is_none());
        assert!(cleaned.get("blank").is_none());
        assert!(cleaned.get("nested").is_none());
        assert_eq!(cleaned.get("list"), Some(&json!(["kept"])));
    }

    #[test]
    fn false_and_zero_survive_cleaning() {
        let (cleaned, is_empty) = clean_request(&request(json!({
            "is_public": false,
            "count": 0,
        })));
        assert_eq!(cleaned.get("is_public"), Some(&json!(false)));
        assert_eq!(cleaned.get("count"), Some(&json!(0)));
        assert!(!is_empty);
    }

    #[test]
    fn pagination_and_sort_keys_do_not_constrain() {
        let (_, is_empty) = clean_request(&request(json!({
            "page": 2,
            "per_page": 10,
            "sort": "title asc",
            "resource-type": "items",
            "search": "",
        })));
        assert!(is_empty);

        let (_, is_empty) = clean_request(&request(json!({
            "page": 2,
            "search": "tree",
        })));
        assert!(!is_empty);
    }

    #[test]
    fn string_list_accepts_scalars_and_arrays() {
        assert_eq!(string_list(&json!("items")), vec!["items"]);
        assert_eq!(string_list(&json!(["items", "media"])), vec!["items", "media"]);
        assert_eq!(string_list(&json!([1, "x", null])), vec!["1", "x"]);
    }
}
