//! The API-shape form adapter.
//!
//! Simulates an API search against an external engine: well-known metadata
//! arguments, `property` rows, and `filter` rows are translated into filter
//! clauses. Only the "and" joiner is honored; `and`/`or` joiners carried by
//! rows are accepted but all clauses end up conjoined.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::field_query::{self, FilterOperator, OperatorKind};
use crate::types::request::positive_int_value;
use crate::types::{FilterClause, FilterValue, FormSettings, Query, SearchRequest};

use super::{FormAdapter, TermResolver};

/// Translates API-style requests. Property terms are narrowed to canonical
/// vocabulary terms through the injected resolver before the settings'
/// property mapping applies.
pub struct ApiFormAdapter {
    terms: Arc<dyn TermResolver>,
}

impl ApiFormAdapter {
    pub fn new(terms: Arc<dyn TermResolver>) -> Self {
        Self { terms }
    }

    /// Well-known metadata arguments. Booleans and `access` are
    /// presence-gated tri-state flags: a `false` value still filters.
    fn build_metadata_query(&self, query: &mut Query, request: &SearchRequest, settings: &FormSettings) {
        let metadata: BTreeMap<&str, &str> = settings
            .metadata
            .iter()
            .filter(|(_, field)| !field.is_empty())
            .map(|(key, field)| (key.as_str(), field.as_str()))
            .collect();
        if metadata.is_empty() {
            return;
        }

        if let (Some(field), Some(value)) = (metadata.get("is_public"), request.get("is_public")) {
            query.add_filter(*field, FilterValue::Bool(truthy(value)), FilterOperator::Eq);
        }

        if let Some(field) = metadata.get("id") {
            add_integers_filter(query, field, request.get("id"));
        }

        if let Some(field) = metadata.get("owner_id") {
            add_integers_filter(query, field, request.get("owner_id"));
        }

        // Kept from the reference behavior: the site_id argument filters on
        // the owner field with the owner value. See DESIGN.md before
        // changing this.
        if metadata.contains_key("site_id") && request.get("site_id").is_some_and(truthy) {
            if let Some(field) = metadata.get("owner_id") {
                add_integers_filter(query, field, request.get("owner_id"));
            }
        }

        if let Some(field) = metadata.get("created") {
            add_integers_filter(query, field, request.get("created"));
        }

        if let Some(field) = metadata.get("modified") {
            add_integers_filter(query, field, request.get("modified"));
        }

        if let Some(field) = metadata.get("resource_class_label") {
            add_texts_filter(query, field, request.get("resource_class_label"));
        }

        if let Some(field) = metadata.get("resource_class_id") {
            add_integers_filter(query, field, request.get("resource_class_id"));
        }

        if let Some(field) = metadata.get("resource_template_id") {
            if request.get("resource_template_id").is_some_and(is_numeric) {
                add_integers_filter(query, field, request.get("resource_template_id"));
            }
        }

        if let Some(field) = metadata.get("item_set_id") {
            add_integers_filter(query, field, request.get("item_set_id"));
        }

        if let (Some(field), Some(value)) = (metadata.get("is_open"), request.get("is_open")) {
            query.add_filter(*field, FilterValue::Bool(truthy(value)), FilterOperator::Eq);
        }

        if let (Some(field), Some(value)) = (metadata.get("access"), request.get("access")) {
            let access = scalar_string(value).unwrap_or_default();
            query.add_filter(*field, FilterValue::Text(access), FilterOperator::Eq);
        }
    }

    /// `property` rows: `{property, type, text, joiner?}`.
    fn build_property_query(&self, query: &mut Query, request: &SearchRequest, settings: &FormSettings) {
        if settings.properties.is_empty() {
            return;
        }
        for row in request.rows("property") {
            if !(row.contains_key("property") && row.contains_key("type")) {
                continue;
            }
            let clause = self.resolve_row(
                row.get("property"),
                row.get("type"),
                row.get("text"),
                &settings.properties,
            );
            if let Some(clause) = clause {
                query.filters.push(clause);
            }
        }
    }

    /// `filter` rows: `{field, type, val, join?}`. Same rules as the
    /// property pass, read from a differently shaped section; the two
    /// shapes come from different callers and are handled separately.
    fn build_filter_query(&self, query: &mut Query, request: &SearchRequest, settings: &FormSettings) {
        if settings.properties.is_empty() {
            return;
        }
        for row in request.rows("filter") {
            if !(row.contains_key("field") && row.contains_key("type")) {
                continue;
            }
            let clause = self.resolve_row(
                row.get("field"),
                row.get("type"),
                row.get("val"),
                &settings.properties,
            );
            if let Some(clause) = clause {
                query.filters.push(clause);
            }
        }
    }

    /// Validate one row into a clause, or `None` to drop it silently.
    fn resolve_row(
        &self,
        field: Option<&Value>,
        operator: Option<&Value>,
        value: Option<&Value>,
        properties: &BTreeMap<String, String>,
    ) -> Option<FilterClause> {
        let operator_name = operator?.as_str()?;

        let value_none = matches!(
            field_query::resolve_operator(operator_name),
            OperatorKind::ValueLess(_)
        );
        if is_logically_empty(value) && !value_none {
            return None;
        }

        // A list-valued field is only usable when it holds a single entry.
        let field_name = match field? {
            Value::String(name) if !name.is_empty() => name.as_str(),
            Value::Array(entries) if entries.len() == 1 => entries[0].as_str()?,
            _ => return None,
        };

        let term = self.terms.resolve(field_name)?;
        let backend_field = properties.get(&term).filter(|f| !f.is_empty())?;

        if let Some(op) = field_query::list_shorthand(operator_name) {
            let list = field_query::expand_list(value?);
            if list.is_empty() {
                // An empty expansion is "no constraint", not an error.
                return None;
            }
            return Some(FilterClause {
                field: backend_field.clone(),
                value: FilterValue::Texts(list),
                operator: op,
            });
        }

        match field_query::resolve_operator(operator_name) {
            OperatorKind::Value(op) => Some(FilterClause {
                field: backend_field.clone(),
                value: filter_value(value?),
                operator: op,
            }),
            OperatorKind::ValueLess(op) => Some(FilterClause {
                field: backend_field.clone(),
                value: FilterValue::Absent,
                operator: op,
            }),
            OperatorKind::Unrecognized => {
                tracing::trace!(operator = operator_name, "dropping row with unrecognized operator");
                None
            }
        }
    }
}

impl FormAdapter for ApiFormAdapter {
    fn label(&self) -> &'static str {
        "Api"
    }

    fn config_fields(&self) -> &'static [&'static str] {
        &[
            "metadata",
            "properties",
            "aliases",
            "remove_diacritics",
            "default_search_partial_word",
        ]
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

        if let Some(term) = request.string_value("search") {
            query.set_term(term);
        }

        // The site scope is not a metadata field; it gates the whole query.
        if let Some(site_id) = request.positive_int("site_id") {
            query.set_site_id(site_id);
        }

        self.build_metadata_query(&mut query, request, settings);
        self.build_property_query(&mut query, request, settings);
        self.build_filter_query(&mut query, request, settings);

        query
    }
}

/// PHP-style truthiness for tri-state request flags: `false`, `0`, `"0"`,
/// `""`, and `null` are false, everything else is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn is_logically_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        _ => false,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        _ => None,
    }
}

/// Verbatim value for a recognized value-requiring operator.
fn filter_value(value: &Value) -> FilterValue {
    match value {
        Value::Array(entries) => FilterValue::Texts(
            entries.iter().filter_map(scalar_string).collect(),
        ),
        other => FilterValue::Text(scalar_string(other).unwrap_or_default()),
    }
}

/// Equality filter on the set of valid positive integers in `value`
/// (scalar or array). An empty set suppresses the clause entirely.
fn add_integers_filter(query: &mut Query, field: &str, value: Option<&Value>) {
    let Some(value) = value else { return };
    if !truthy(value) {
        return;
    }
    let entries: Vec<&Value> = match value {
        Value::Array(entries) => entries.iter().collect(),
        other => vec![other],
    };
    let integers: Vec<u64> = entries.into_iter().filter_map(positive_int_value).collect();
    if !integers.is_empty() {
        query.add_filter(field, FilterValue::Integers(integers), FilterOperator::Eq);
    }
}

/// Equality filter on the set of non-empty trimmed strings in `value`.
fn add_texts_filter(query: &mut Query, field: &str, value: Option<&Value>) {
    let Some(value) = value else { return };
    if !truthy(value) {
        return;
    }
    let entries: Vec<&Value> = match value {
        Value::Array(entries) => entries.iter().collect(),
        other => vec![other],
    };
    let texts: Vec<String> = entries
        .into_iter()
        .filter_map(scalar_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !texts.is_empty() {
        query.add_filter(field, FilterValue::Texts(texts), FilterOperator::Eq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct PrefixResolver;

    /// Resolves anything containing a colon, as a stand-in for a
    /// vocabulary lookup.
    impl TermResolver for PrefixResolver {
        fn resolve(&self, term_or_id: &str) -> Option<String> {
            term_or_id.contains(':').then(|| term_or_id.to_string())
        }
    }

    fn adapter() -> ApiFormAdapter {
        ApiFormAdapter::new(Arc::new(PrefixResolver))
    }

    fn settings() -> FormSettings {
        let mut settings = FormSettings::default();
        settings.properties.insert("dcterms:title".into(), "title_field".into());
        settings.properties.insert("dcterms:subject".into(), "subject_field".into());
        settings.metadata.insert("is_public".into(), "public_field".into());
        settings.metadata.insert("owner_id".into(), "owner_field".into());
        settings.metadata.insert("site_id".into(), "site_field".into());
        settings.metadata.insert("id".into(), "id_field".into());
        settings.metadata.insert("access".into(), "access_field".into());
        settings
    }

    fn request(value: serde_json::Value) -> SearchRequest {
        SearchRequest::from_value(value)
    }

    #[test]
    fn term_and_property_row_build_clauses() {
        let query = adapter().to_query(
            &request(json!({
                "search": "tree",
                "property": [{"property": "dcterms:title", "type": "eq", "text": "Oak"}],
            })),
            &settings(),
        );
        assert_eq!(query.term.as_deref(), Some("tree"));
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "title_field");
        assert_eq!(query.filters[0].value, FilterValue::Text("Oak".into()));
        assert_eq!(query.filters[0].operator, FilterOperator::Eq);
    }

    #[test]
    fn empty_value_with_value_requiring_operator_drops_row() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "dcterms:title", "type": "eq", "text": ""},
                {"property": "dcterms:subject", "type": "eq", "text": "Botany"},
            ]})),
            &settings(),
        );
        // The malformed row is skipped, the next one still lands.
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "subject_field");
    }

    #[test]
    fn presence_operator_needs_no_value() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "dcterms:title", "type": "nex"},
            ]})),
            &settings(),
        );
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, FilterValue::Absent);
        assert_eq!(query.filters[0].operator, FilterOperator::Nex);
    }

    #[test]
    fn unresolvable_or_unmapped_terms_drop_rows() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "notaterm", "type": "eq", "text": "x"},
                {"property": "dcterms:unmapped", "type": "eq", "text": "x"},
                {"property": ["dcterms:title", "dcterms:subject"], "type": "eq", "text": "x"},
            ]})),
            &settings(),
        );
        assert!(query.filters.is_empty());
    }

    #[test]
    fn unrecognized_operator_drops_row() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "dcterms:title", "type": "res", "text": "x"},
            ]})),
            &settings(),
        );
        assert!(query.filters.is_empty());
    }

    #[test]
    fn list_shorthand_expands_to_equality_array() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "dcterms:title", "type": "list", "text": "a\nb\n\nc"},
                {"property": "dcterms:subject", "type": "nlist", "text": "d\ne"},
            ]})),
            &settings(),
        );
        assert_eq!(query.filters.len(), 2);
        assert_eq!(
            query.filters[0].value,
            FilterValue::Texts(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(query.filters[0].operator, FilterOperator::Eq);
        assert_eq!(query.filters[1].operator, FilterOperator::Neq);
    }

    #[test]
    fn empty_list_expansion_is_no_constraint() {
        let query = adapter().to_query(
            &request(json!({"property": [
                {"property": "dcterms:title", "type": "list", "text": "\n \n"},
            ]})),
            &settings(),
        );
        assert!(query.filters.is_empty());
    }

    #[test]
    fn filter_rows_use_their_own_key_shape() {
        let query = adapter().to_query(
            &request(json!({"filter": [
                {"field": "dcterms:title", "type": "neq", "val": "Oak"},
                {"field": "dcterms:title", "val": "no type key"},
            ]})),
            &settings(),
        );
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].operator, FilterOperator::Neq);
    }

    #[test]
    fn boolean_metadata_applies_even_when_false() {
        let query = adapter().to_query(
            &request(json!({"is_public": false})),
            &settings(),
        );
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "public_field");
        assert_eq!(query.filters[0].value, FilterValue::Bool(false));
    }

    #[test]
    fn integer_metadata_extracts_valid_positive_integers() {
        let query = adapter().to_query(
            &request(json!({"id": [3, "7", "junk", 0]})),
            &settings(),
        );
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].value, FilterValue::Integers(vec![3, 7]));
    }

    #[test]
    fn all_invalid_integers_suppress_the_clause() {
        let query = adapter().to_query(&request(json!({"id": ["junk", 0]})), &settings());
        assert!(query.filters.is_empty());
    }

    #[test]
    fn site_id_metadata_reuses_owner_field_and_value() {
        // Pinned reference behavior; see DESIGN.md.
        let query = adapter().to_query(
            &request(json!({"site_id": 9, "owner_id": 4})),
            &settings(),
        );
        let owner_clauses: Vec<_> = query
            .filters
            .iter()
            .filter(|clause| clause.field == "owner_field")
            .collect();
        assert_eq!(owner_clauses.len(), 2);
        assert!(query.filters.iter().all(|clause| clause.field != "site_field"));
        assert_eq!(query.site_id, Some(9));
    }

    #[test]
    fn options_and_aliases_come_from_settings() {
        let mut with_options = settings();
        with_options.remove_diacritics = true;
        with_options.aliases.insert("title".into(), "dcterms:title".into());
        let query = adapter().to_query(&request(json!({})), &with_options);
        assert_eq!(query.options["remove_diacritics"], json!(true));
        assert_eq!(query.aliases["title"], "dcterms:title");
    }

    #[test]
    fn to_response_is_a_fixed_failure() {
        let response = adapter().to_response(&request(json!({"search": "x"})), None);
        assert!(!response.success);
        assert_eq!(
            response.message.as_deref(),
            Some("Not implemented in this form adapter.")
        );
    }
}
