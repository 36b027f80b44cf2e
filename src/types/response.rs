//! The normalized search result returned by queriers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One ranked result. Identity is an opaque backend identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    /// Resource type the item belongs to.
    pub resource: String,
    pub score: f64,
}

/// One facet value with its result count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValueCount {
    pub value: String,
    pub count: u64,
}

/// Engine-agnostic search result.
///
/// Built by a querier on the success path, or by the orchestrator / an
/// adapter on the failure path. A failure response carries a message and
/// nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Total result count per resource type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub totals: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ResultItem>,
    /// Facet counts per field, ordered. The orchestrator reorders and
    /// filters this to the declared facet configuration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facet_counts: Vec<(String, Vec<FacetValueCount>)>,
}

impl Response {
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn set_total(&mut self, resource: impl Into<String>, total: u64) -> &mut Self {
        self.totals.insert(resource.into(), total);
        self
    }

    /// Total results for one resource type; unreported types count as zero.
    pub fn total_for(&self, resource: &str) -> u64 {
        self.totals.get(resource).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item: ResultItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn set_facet_counts(&mut self, facet_counts: Vec<(String, Vec<FacetValueCount>)>) -> &mut Self {
        self.facet_counts = facet_counts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_message_only() {
        let response = Response::failure("backend unreachable");
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("backend unreachable"));
        assert!(response.items.is_empty());
        assert!(response.facet_counts.is_empty());
    }

    #[test]
    fn unreported_totals_are_zero() {
        let mut response = Response::success();
        response.set_total("items", 7);
        assert_eq!(response.total_for("items"), 7);
        assert_eq!(response.total_for("media"), 0);
    }
}
