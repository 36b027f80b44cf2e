//! The canonical, engine-agnostic search query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_query::FilterOperator;

/// A single `{field, operator, value}` constraint within a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Backend field name (already mapped from the request's vocabulary).
    pub field: String,
    pub value: FilterValue,
    pub operator: FilterOperator,
}

/// The value carried by a filter clause.
///
/// `Absent` is only legal with the value-less operators (`ex`/`nex`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Absent,
    Bool(bool),
    Integer(u64),
    Text(String),
    Integers(Vec<u64>),
    Texts(Vec<String>),
}

/// Facet configuration copied from the stored search configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSpec {
    /// Requested facet fields, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

/// Normalized search request handed to a [`Querier`](crate::querier::Querier).
///
/// Built exclusively by a form adapter, augmented by the orchestrator, and
/// never mutated by a backend. Setters chain and overwrite on repeat calls;
/// pagination is clamped so `page` and `per_page` are always at least 1.
/// The serde form is total and lossless, so a query can be round-tripped
/// through logs and error messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Free-text search term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    /// Site scope, when searching within one site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<u64>,
    /// Resource types to search, in request order. Empty means engine default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Visibility tri-state: `None` leaves the backend default (public only),
    /// `Some(false)` includes private content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    /// Filter clauses, all implicitly conjoined.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    pub page: u64,
    pub per_page: u64,
    #[serde(default)]
    pub facets: FacetSpec,
    /// Active facet selections: facet field -> selected values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub active_facets: BTreeMap<String, Vec<String>>,
    /// Free-form adapter/backend toggles ("remove_diacritics", ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    /// Alias name -> canonical field name, resolved before dispatch.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            term: None,
            site_id: None,
            resources: Vec::new(),
            is_public: None,
            filters: Vec::new(),
            sort: None,
            page: 1,
            per_page: 1,
            facets: FacetSpec::default(),
            active_facets: BTreeMap::new(),
            options: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_term<S: Into<String>>(&mut self, term: S) -> &mut Self {
        self.term = Some(term.into());
        self
    }

    /// Set the site scope. Zero is not a valid site id and is ignored.
    pub fn set_site_id(&mut self, site_id: u64) -> &mut Self {
        if site_id > 0 {
            self.site_id = Some(site_id);
        }
        self
    }

    /// Set the resource-type filter. An empty list clears it back to the
    /// engine default rather than storing an unsatisfiable constraint.
    pub fn set_resources(&mut self, resources: Vec<String>) -> &mut Self {
        self.resources = resources;
        self
    }

    pub fn set_is_public(&mut self, is_public: bool) -> &mut Self {
        self.is_public = Some(is_public);
        self
    }

    pub fn add_filter(&mut self, field: impl Into<String>, value: FilterValue, operator: FilterOperator) -> &mut Self {
        self.filters.push(FilterClause {
            field: field.into(),
            value,
            operator,
        });
        self
    }

    pub fn set_sort<S: Into<String>>(&mut self, sort: S) -> &mut Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set pagination, clamping both values to at least 1.
    pub fn set_limit_page(&mut self, page: u64, per_page: u64) -> &mut Self {
        self.page = page.max(1);
        self.per_page = per_page.max(1);
        self
    }

    /// Append facet fields, keeping declared order and dropping duplicates.
    pub fn add_facet_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.facets.fields.contains(&field) {
                self.facets.fields.push(field);
            }
        }
        self
    }

    pub fn set_facet_limit(&mut self, limit: u64) -> &mut Self {
        self.facets.limit = Some(limit);
        self
    }

    pub fn set_facet_order<S: Into<String>>(&mut self, order: S) -> &mut Self {
        self.facets.order = Some(order.into());
        self
    }

    pub fn set_facet_languages(&mut self, languages: Vec<String>) -> &mut Self {
        self.facets.languages = languages;
        self
    }

    pub fn add_active_facet(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.active_facets.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn set_option(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn set_aliases(&mut self, aliases: BTreeMap<String, String>) -> &mut Self {
        self.aliases = aliases;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_chain_and_overwrite() {
        let mut query = Query::new();
        query
            .set_term("tree")
            .set_term("oak")
            .set_site_id(2)
            .set_sort("title asc");
        assert_eq!(query.term.as_deref(), Some("oak"));
        assert_eq!(query.site_id, Some(2));
        assert_eq!(query.sort.as_deref(), Some("title asc"));
    }

    #[test]
    fn pagination_clamps_to_one() {
        let mut query = Query::new();
        query.set_limit_page(0, 0);
        assert_eq!((query.page, query.per_page), (1, 1));
        query.set_limit_page(3, 50);
        assert_eq!((query.page, query.per_page), (3, 50));
    }

    #[test]
    fn zero_site_id_is_ignored() {
        let mut query = Query::new();
        query.set_site_id(0);
        assert_eq!(query.site_id, None);
    }

    #[test]
    fn facet_fields_keep_order_and_dedupe() {
        let mut query = Query::new();
        query.add_facet_fields(["author", "subject"]);
        query.add_facet_fields(["subject", "date"]);
        assert_eq!(query.facets.fields, vec!["author", "subject", "date"]);
    }

    #[test]
    fn active_facets_accumulate_values() {
        let mut query = Query::new();
        query.add_active_facet("author", "a").add_active_facet("author", "b");
        assert_eq!(query.active_facets["author"], vec!["a", "b"]);
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let mut query = Query::new();
        query
            .set_term("tree")
            .set_is_public(false)
            .set_resources(vec!["items".into()])
            .add_filter("title_field", FilterValue::Text("Oak".into()), FilterOperator::Eq)
            .add_filter("dates", FilterValue::Absent, FilterOperator::Nex)
            .set_limit_page(2, 25)
            .add_facet_fields(["author"])
            .add_active_facet("author", "Someone")
            .set_option("remove_diacritics", serde_json::Value::Bool(true));
        let encoded = serde_json::to_string(&query).unwrap();
        let decoded: Query = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, query);
    }
}
