//! Stored, per-deployment configuration consumed by the core.
//!
//! These trees are loaded by an external configuration store; the core only
//! reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form-adapter settings: field mappings plus adapter-specific toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    /// Well-known metadata key -> backend field name.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Canonical vocabulary term -> backend field name.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Direct request field -> backend field name (main form filter rows).
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    /// Alias name -> canonical field name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub remove_diacritics: bool,
    #[serde(default)]
    pub default_search_partial_word: bool,
}

/// Facet declarations of a search configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSettings {
    /// Declared facet fields, in display order.
    #[serde(default)]
    pub facets: Vec<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// A declared sort option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortField {
    /// Sort key sent to the backend (e.g. `"title asc"`).
    pub name: String,
    /// Human label for the presentation layer.
    pub label: String,
}

impl SortField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// One stored search configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Registry name of the form adapter to use.
    pub form_adapter: String,
    #[serde(default)]
    pub form: FormSettings,
    #[serde(default)]
    pub facet: FacetSettings,
    /// Declared sort options, in order; the first valid one is the fallback.
    #[serde(default)]
    pub sort_fields: Vec<SortField>,
}

/// Engine-level settings the orchestrator reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Default resource types searched when the request names none.
    #[serde(default)]
    pub resources: Vec<String>,
}

/// The site a scoped search runs under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContext {
    pub id: u64,
    /// Site-level page-size default, if configured.
    #[serde(default)]
    pub per_page: Option<u64>,
}
