//! The raw, still-untyped search request.
//!
//! Requests arrive as a loose string-keyed tree (decoded HTML form, API
//! query string, or a programmatic caller); adapters pull typed values out
//! of it. Shape errors never fail a call here, accessors just return `None`.

use serde_json::{Map, Value};

/// A raw request map. Wraps a JSON object so heterogeneous callers share
/// one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest(Map<String, Value>);

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value; anything but an object becomes an empty
    /// request.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String value for `key`; numbers are rendered, other shapes are `None`.
    pub fn string_value(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Positive integer for `key`, accepting a JSON number or a numeric
    /// string. Zero, negatives, and garbage are `None`.
    pub fn positive_int(&self, key: &str) -> Option<u64> {
        positive_int_value(self.0.get(key)?)
    }

    /// Scalar-or-array access: a lone scalar is returned as a one-element
    /// slice view.
    pub fn values(&self, key: &str) -> Vec<&Value> {
        match self.0.get(key) {
            Some(Value::Array(entries)) => entries.iter().collect(),
            Some(value) => vec![value],
            None => Vec::new(),
        }
    }

    /// Array-of-objects access for filter/property row sections. Non-object
    /// entries are dropped, a non-array value yields no rows.
    pub fn rows(&self, key: &str) -> Vec<&Map<String, Value>> {
        match self.0.get(key) {
            Some(Value::Array(entries)) => entries.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }
}

impl From<Map<String, Value>> for SearchRequest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Positive integer out of a scalar value, tolerating numeric strings.
pub(crate) fn positive_int_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().filter(|v| *v > 0),
        Value::String(s) => s.trim().parse::<u64>().ok().filter(|v| *v > 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_values_become_empty_requests() {
        assert!(SearchRequest::from_value(json!("search")).is_empty());
        assert!(SearchRequest::from_value(json!([1, 2])).is_empty());
    }

    #[test]
    fn positive_int_accepts_numeric_strings() {
        let request = SearchRequest::from_value(json!({
            "site_id": "3", "page": 2, "bad": "x", "zero": 0, "neg": -1
        }));
        assert_eq!(request.positive_int("site_id"), Some(3));
        assert_eq!(request.positive_int("page"), Some(2));
        assert_eq!(request.positive_int("bad"), None);
        assert_eq!(request.positive_int("zero"), None);
        assert_eq!(request.positive_int("neg"), None);
    }

    #[test]
    fn values_wraps_scalars() {
        let request = SearchRequest::from_value(json!({"id": 5, "ids": [1, 2]}));
        assert_eq!(request.values("id").len(), 1);
        assert_eq!(request.values("ids").len(), 2);
        assert!(request.values("missing").is_empty());
    }

    #[test]
    fn rows_keeps_only_objects() {
        let request = SearchRequest::from_value(json!({
            "filter": [{"field": "a"}, "junk", {"field": "b"}],
            "scalar": "x"
        }));
        assert_eq!(request.rows("filter").len(), 2);
        assert!(request.rows("scalar").is_empty());
    }
}
