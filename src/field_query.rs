//! Recognized filter operators and their reciprocal pairs.
//!
//! The operator table is process-wide constant data. Form adapters use it to
//! decide whether a requested operator is legal before accepting a filter
//! clause, and to expand the deprecated `list`/`nlist` shorthand into the
//! canonical equality operators.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filter operator accepted in a [`FilterClause`](crate::types::FilterClause).
///
/// Every variant has a reciprocal (its logical negation); `Ex`/`Nex` are the
/// only operators that take no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equals (value may be a list, matched as "any of").
    Eq,
    /// Does not equal.
    Neq,
    /// Contains.
    In,
    /// Does not contain.
    Nin,
    /// Starts with.
    Sw,
    /// Does not start with.
    Nsw,
    /// Ends with.
    Ew,
    /// Does not end with.
    New,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Lower than or equal.
    Lte,
    /// Lower than.
    Lt,
    /// Has any value.
    Ex,
    /// Has no value.
    Nex,
}

static OPERATOR_NAMES: Lazy<HashMap<&'static str, FilterOperator>> = Lazy::new(|| {
    use FilterOperator::*;
    HashMap::from([
        ("eq", Eq),
        ("neq", Neq),
        ("in", In),
        ("nin", Nin),
        ("sw", Sw),
        ("nsw", Nsw),
        ("ew", Ew),
        ("new", New),
        ("gt", Gt),
        ("gte", Gte),
        ("lte", Lte),
        ("lt", Lt),
        ("ex", Ex),
        ("nex", Nex),
    ])
});

impl FilterOperator {
    /// Look up an operator by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATOR_NAMES.get(name).copied()
    }

    /// The operator's wire name.
    pub fn as_str(self) -> &'static str {
        use FilterOperator::*;
        match self {
            Eq => "eq",
            Neq => "neq",
            In => "in",
            Nin => "nin",
            Sw => "sw",
            Nsw => "nsw",
            Ew => "ew",
            New => "new",
            Gt => "gt",
            Gte => "gte",
            Lte => "lte",
            Lt => "lt",
            Ex => "ex",
            Nex => "nex",
        }
    }

    /// The logical negation of this operator.
    ///
    /// Range operators pair across the boundary: `gt` with `lte`, `gte`
    /// with `lt`.
    pub fn reciprocal(self) -> Self {
        use FilterOperator::*;
        match self {
            Eq => Neq,
            Neq => Eq,
            In => Nin,
            Nin => In,
            Sw => Nsw,
            Nsw => Sw,
            Ew => New,
            New => Ew,
            Gt => Lte,
            Lte => Gt,
            Gte => Lt,
            Lt => Gte,
            Ex => Nex,
            Nex => Ex,
        }
    }

    /// Whether the operator needs a value at all.
    pub fn requires_value(self) -> bool {
        !matches!(self, Self::Ex | Self::Nex)
    }
}

/// How a requested operator name classifies against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Recognized, needs a value.
    Value(FilterOperator),
    /// Recognized, takes no value (presence/absence test).
    ValueLess(FilterOperator),
    /// Not in the table; the clause must be dropped.
    Unrecognized,
}

/// Classify a requested operator name.
pub fn resolve_operator(name: &str) -> OperatorKind {
    match FilterOperator::from_name(name) {
        Some(op) if op.requires_value() => OperatorKind::Value(op),
        Some(op) => OperatorKind::ValueLess(op),
        None => OperatorKind::Unrecognized,
    }
}

/// Expand the deprecated `list`/`nlist` shorthand into its canonical
/// operator, or `None` if `name` is not a list shorthand.
pub fn list_shorthand(name: &str) -> Option<FilterOperator> {
    match name {
        "list" => Some(FilterOperator::Eq),
        "nlist" => Some(FilterOperator::Neq),
        _ => None,
    }
}

/// Expand a list-shorthand value into its entries.
///
/// Accepts an array of scalars or a newline-separated string; entries are
/// trimmed and empty ones dropped. An empty result means "no constraint"
/// and the caller drops the clause silently.
pub fn expand_list(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(text) => text.split('\n').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}
