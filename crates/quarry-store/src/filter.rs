//! Metadata filters attached to queries.
//!
//! A [`Filter`] is a backend-agnostic description of a metadata condition.
//! Vendor backends translate [`Filter::to_value`] into their own dialect;
//! the in-process stores evaluate it directly with [`Filter::matches`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::document::Metadata;

/// A condition over document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// `field == value`.
    Equal {
        /// Metadata key.
        field: String,
        /// Expected value.
        value: Value,
    },

    /// `field != value`. A missing field counts as not equal.
    NotEqual {
        /// Metadata key.
        field: String,
        /// Rejected value.
        value: Value,
    },

    /// `field` equals one of `values`.
    In {
        /// Metadata key.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },

    /// Every inner filter matches.
    And {
        /// Inner filters.
        filters: Vec<Filter>,
    },

    /// At least one inner filter matches.
    Or {
        /// Inner filters.
        filters: Vec<Filter>,
    },
}

impl Filter {
    /// `field == value`.
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field != value`.
    pub fn not_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEqual {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `field` in `values`.
    pub fn one_of<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And {
            filters: filters.into_iter().collect(),
        }
    }

    /// Disjunction of filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or {
            filters: filters.into_iter().collect(),
        }
    }

    /// Serializable, backend-agnostic form of this filter.
    pub fn to_value(&self) -> Value {
        // Serialization of this enum cannot fail: every field is JSON already.
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }

    /// Evaluate the filter against document metadata.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Equal { field, value } => metadata.get(field) == Some(value),
            Self::NotEqual { field, value } => metadata.get(field) != Some(value),
            Self::In { field, values } => metadata
                .get(field)
                .is_some_and(|actual| values.contains(actual)),
            Self::And { filters } => filters.iter().all(|f| f.matches(metadata)),
            Self::Or { filters } => filters.iter().any(|f| f.matches(metadata)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata::new()
            .with("lang", "en")
            .with("year", 2024)
            .with("draft", false)
    }

    #[test]
    fn test_filter_equal() {
        assert!(Filter::equal("lang", "en").matches(&metadata()));
        assert!(!Filter::equal("lang", "fr").matches(&metadata()));
        assert!(!Filter::equal("missing", "en").matches(&metadata()));
    }

    #[test]
    fn test_filter_equal_is_type_strict() {
        assert!(Filter::equal("year", 2024).matches(&metadata()));
        assert!(!Filter::equal("year", "2024").matches(&metadata()));
    }

    #[test]
    fn test_filter_not_equal() {
        assert!(Filter::not_equal("lang", "fr").matches(&metadata()));
        assert!(!Filter::not_equal("lang", "en").matches(&metadata()));
        assert!(Filter::not_equal("missing", "x").matches(&metadata()));
    }

    #[test]
    fn test_filter_in() {
        assert!(Filter::one_of("lang", ["de", "en"]).matches(&metadata()));
        assert!(!Filter::one_of("lang", ["de", "fr"]).matches(&metadata()));
        assert!(!Filter::one_of("missing", ["en"]).matches(&metadata()));
    }

    #[test]
    fn test_filter_and_or() {
        let both = Filter::and([Filter::equal("lang", "en"), Filter::equal("draft", false)]);
        assert!(both.matches(&metadata()));

        let mismatch = Filter::and([Filter::equal("lang", "en"), Filter::equal("draft", true)]);
        assert!(!mismatch.matches(&metadata()));

        let either = Filter::or([Filter::equal("lang", "fr"), Filter::equal("year", 2024)]);
        assert!(either.matches(&metadata()));

        // Empty conjunction is vacuously true, empty disjunction false.
        assert!(Filter::and(Vec::<Filter>::new()).matches(&metadata()));
        assert!(!Filter::or(Vec::<Filter>::new()).matches(&metadata()));
    }

    #[test]
    fn test_filter_to_value() {
        let value = Filter::equal("lang", "en").to_value();
        assert_eq!(
            value,
            json!({"type": "equal", "field": "lang", "value": "en"})
        );

        let nested = Filter::or([Filter::one_of("year", [2023, 2024])]).to_value();
        assert_eq!(nested["type"], "or");
        assert_eq!(nested["filters"][0]["type"], "in");
        assert_eq!(nested["filters"][0]["values"], json!([2023, 2024]));
    }

    #[test]
    fn test_filter_deserialization() {
        let filter: Filter =
            serde_json::from_str(r#"{"type": "not_equal", "field": "lang", "value": "fr"}"#)
                .unwrap();
        assert_eq!(filter, Filter::not_equal("lang", "fr"));
    }
}
