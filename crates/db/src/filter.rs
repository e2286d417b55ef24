//! Predicates over document fields.
//!
//! Callers describe lookups in terms of entity fields and the store evaluates
//! them against its own document representation, so handlers never build raw
//! queries.

use serde_json::{Map, Value};

use crate::id::DocumentId;
use crate::store::ID_FIELD;

/// A predicate evaluated against stored documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the given JSON value exactly.
    Eq(String, Value),
    /// String field equals the given text, ignoring case.
    EqIgnoreCase(String, String),
    /// Document identity equals the given id.
    Id(DocumentId),
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn eq_ignore_case(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::EqIgnoreCase(field.into(), text.into())
    }

    pub fn id(id: DocumentId) -> Self {
        Self::Id(id)
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            Filter::All => other,
            first => Filter::And(vec![first, other]),
        }
    }

    /// Evaluate the predicate against a stored document.
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, expected) => document.get(field) == Some(expected),
            Filter::EqIgnoreCase(field, expected) => document
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|actual| actual.to_lowercase() == expected.to_lowercase()),
            Filter::Id(id) => document
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .is_some_and(|actual| actual == id.to_string()),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn eq_ignore_case_matches_mixed_case() {
        let d = doc(json!({"title": "Widget"}));
        assert!(Filter::eq_ignore_case("title", "wIDGET").matches(&d));
        assert!(!Filter::eq_ignore_case("title", "Gadget").matches(&d));
    }

    #[test]
    fn eq_ignore_case_skips_non_string_fields() {
        let d = doc(json!({"title": 42}));
        assert!(!Filter::eq_ignore_case("title", "42").matches(&d));
    }

    #[test]
    fn and_requires_every_clause() {
        let d = doc(json!({"title": "Widget", "active": true}));
        let filter = Filter::eq("active", true).and(Filter::eq_ignore_case("title", "widget"));
        assert!(filter.matches(&d));

        let filter = Filter::eq("active", false).and(Filter::eq_ignore_case("title", "widget"));
        assert!(!filter.matches(&d));
    }

    #[test]
    fn all_and_composition_collapses() {
        let filter = Filter::All.and(Filter::eq("active", true));
        assert_eq!(filter, Filter::eq("active", true));
    }

    #[test]
    fn id_filter_compares_string_form() {
        let id = DocumentId::generate();
        let d = doc(json!({"_id": id.to_string()}));
        assert!(Filter::id(id).matches(&d));
        assert!(!Filter::id(DocumentId::generate()).matches(&d));
    }
}
