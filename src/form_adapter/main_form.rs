//! The main (HTML form) adapter.
//!
//! The simplest request dialect: a free-text term, an optional sort picked
//! in the form, and `filter` rows whose fields map straight through the
//! settings' filter table. Unlike the API adapter it sets the sort, so the
//! orchestrator re-validates it against the configured sort options.

use serde_json::Value;

use crate::field_query::{self, OperatorKind};
use crate::types::{FilterValue, FormSettings, Query, SearchRequest};

use super::FormAdapter;

#[derive(Debug, Default)]
pub struct MainFormAdapter;

impl MainFormAdapter {
    pub fn new() -> Self {
        Self
    }

    /// `filter` rows `{field, type, val}`; fields are backend names keyed
    /// through `settings.filters`, no vocabulary resolution involved.
    fn build_filter_query(query: &mut Query, request: &SearchRequest, settings: &FormSettings) {
        if settings.filters.is_empty() {
            return;
        }
        for row in request.rows("filter") {
            if !(row.contains_key("field") && row.contains_key("type")) {
                continue;
            }
            let Some(field_name) = row.get("field").and_then(Value::as_str) else {
                continue;
            };
            let Some(backend_field) = settings.filters.get(field_name).filter(|f| !f.is_empty())
            else {
                continue;
            };
            let Some(operator_name) = row.get("type").and_then(Value::as_str) else {
                continue;
            };
            let value = row.get("val");

            if let Some(op) = field_query::list_shorthand(operator_name) {
                let list = value.map(field_query::expand_list).unwrap_or_default();
                if !list.is_empty() {
                    query.add_filter(backend_field, FilterValue::Texts(list), op);
                }
                continue;
            }

            match field_query::resolve_operator(operator_name) {
                OperatorKind::Value(op) => {
                    let Some(text) = value.and_then(Value::as_str).map(str::trim) else {
                        continue;
                    };
                    if text.is_empty() {
                        continue;
                    }
                    query.add_filter(backend_field, FilterValue::Text(text.to_string()), op);
                }
                OperatorKind::ValueLess(op) => {
                    query.add_filter(backend_field, FilterValue::Absent, op);
                }
                OperatorKind::Unrecognized => {}
            }
        }
    }
}

impl FormAdapter for MainFormAdapter {
    fn label(&self) -> &'static str {
        "Main form"
    }

    fn config_fields(&self) -> &'static [&'static str] {
        &["filters", "aliases", "remove_diacritics", "default_search_partial_word"]
    }

    fn to_query(&self, request: &SearchRequest, settings: &FormSettings) -> Query {
        let mut query = Query::new();
        query
            .set_aliases(settings.aliases.clone())
            .set_option("remove_diacritics", Value::Bool(settings.remove_diacritics))
            .set_option(
                "default_search_partial_word",
                Value::Bool(settings.default_search_partial_word),
            );

        if let Some(term) = request.string_value("q").or_else(|| request.string_value("search")) {
            query.set_term(term);
        }

        if let Some(sort) = request.string_value("sort") {
            query.set_sort(sort);
        }

        Self::build_filter_query(&mut query, request, settings);

        query
    }
}
