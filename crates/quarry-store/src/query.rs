//! Typed search requests.
//!
//! [`Query`] is a closed union over the three request shapes a store can
//! execute. Stores declare which [`QueryKind`]s they support; the
//! [`Retriever`](crate::Retriever) uses that to pick the richest shape.
//!
//! | Kind     | Carries                                   | Scoring              |
//! |----------|-------------------------------------------|----------------------|
//! | `vector` | dense vector                              | distance strategy    |
//! | `text`   | one or more search terms (OR-combined)    | none                 |
//! | `hybrid` | vector + terms + semantic ratio in [0, 1] | vector score × ratio |

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filter::Filter;
use crate::vector::Vector;

/// Default weight of the vector score in hybrid queries.
pub const DEFAULT_SEMANTIC_RATIO: f32 = 0.5;

/// Discriminant of a [`Query`], used for capability negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Nearest-neighbour search by embedding.
    Vector,
    /// Lexical match against the source text.
    Text,
    /// Vector and lexical search merged.
    Hybrid,
}

impl QueryKind {
    /// Every query kind.
    pub const ALL: [QueryKind; 3] = [QueryKind::Vector, QueryKind::Text, QueryKind::Hybrid];

    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Text => "text",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Query variants
// ============================================================================

/// Search by embedding similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    vector: Vector,
    filter: Option<Filter>,
}

impl VectorQuery {
    /// Create a vector query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for the null vector, which cannot
    /// be compared against anything.
    pub fn new(vector: Vector) -> Result<Self> {
        if vector.is_null() {
            return Err(Error::invalid_argument(
                "a vector query needs a dense vector, got the null vector",
            ));
        }
        Ok(Self {
            vector,
            filter: None,
        })
    }

    /// Attach a metadata filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The query vector.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// The metadata filter, if any.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

/// Search by case-insensitive substring match on the source text.
///
/// A document matches when ANY of the terms occurs in its text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuery {
    texts: Vec<String>,
    filter: Option<Filter>,
}

impl TextQuery {
    /// Create a text query with a single term.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
            filter: None,
        }
    }

    /// Create a text query with several OR-combined terms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when no term is given.
    pub fn with_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Result<Self> {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        if texts.is_empty() {
            return Err(Error::invalid_argument(
                "a text query needs at least one search term",
            ));
        }
        Ok(Self {
            texts,
            filter: None,
        })
    }

    /// Attach a metadata filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// All search terms.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The search terms joined by a single space.
    pub fn text(&self) -> String {
        self.texts.join(" ")
    }

    /// The metadata filter, if any.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

/// Vector and lexical search combined with a tunable blend.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridQuery {
    vector: Vector,
    texts: Vec<String>,
    semantic_ratio: f32,
    filter: Option<Filter>,
}

impl HybridQuery {
    /// Create a hybrid query with a single search term.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `semantic_ratio` is outside
    /// `[0, 1]` (or NaN), or when `vector` is the null vector. Ratios are
    /// never clamped.
    pub fn new(vector: Vector, text: impl Into<String>, semantic_ratio: f32) -> Result<Self> {
        Self::with_texts(vector, [text.into()], semantic_ratio)
    }

    /// Create a hybrid query with several OR-combined search terms.
    ///
    /// # Errors
    ///
    /// As [`HybridQuery::new`], plus an empty term list.
    pub fn with_texts<S: Into<String>>(
        vector: Vector,
        texts: impl IntoIterator<Item = S>,
        semantic_ratio: f32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&semantic_ratio) {
            return Err(Error::invalid_argument(format!(
                "semantic ratio must be within [0, 1], got {semantic_ratio}"
            )));
        }
        let TextQuery { texts, .. } = TextQuery::with_texts(texts)?;
        let VectorQuery { vector, .. } = VectorQuery::new(vector)?;
        Ok(Self {
            vector,
            texts,
            semantic_ratio,
            filter: None,
        })
    }

    /// Attach a metadata filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The query vector.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// All search terms.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// The search terms joined by a single space.
    pub fn text(&self) -> String {
        self.texts.join(" ")
    }

    /// Weight of the vector score.
    pub fn semantic_ratio(&self) -> f32 {
        self.semantic_ratio
    }

    /// Weight of the keyword match, `1 - semantic_ratio`.
    pub fn keyword_ratio(&self) -> f32 {
        1.0 - self.semantic_ratio
    }

    /// The metadata filter, if any.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }
}

// ============================================================================
// Query
// ============================================================================

/// A search request a [`Store`](crate::Store) can execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// See [`VectorQuery`].
    Vector(VectorQuery),
    /// See [`TextQuery`].
    Text(TextQuery),
    /// See [`HybridQuery`].
    Hybrid(HybridQuery),
}

impl Query {
    /// The kind of this query.
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Vector(_) => QueryKind::Vector,
            Self::Text(_) => QueryKind::Text,
            Self::Hybrid(_) => QueryKind::Hybrid,
        }
    }

    /// The metadata filter carried by the query, if any.
    pub fn filter(&self) -> Option<&Filter> {
        match self {
            Self::Vector(q) => q.filter(),
            Self::Text(q) => q.filter(),
            Self::Hybrid(q) => q.filter(),
        }
    }
}

impl From<VectorQuery> for Query {
    fn from(query: VectorQuery) -> Self {
        Self::Vector(query)
    }
}

impl From<TextQuery> for Query {
    fn from(query: TextQuery) -> Self {
        Self::Text(query)
    }
}

impl From<HybridQuery> for Query {
    fn from(query: HybridQuery) -> Self {
        Self::Hybrid(query)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn vector() -> Vector {
        Vector::new(vec![0.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn test_query_kind_display() {
        assert_eq!(QueryKind::Vector.to_string(), "vector");
        assert_eq!(QueryKind::Text.to_string(), "text");
        assert_eq!(QueryKind::Hybrid.to_string(), "hybrid");
        assert_eq!(QueryKind::ALL.len(), 3);
    }

    #[test]
    fn test_query_kind_serialization() {
        assert_eq!(serde_json::to_string(&QueryKind::Hybrid).unwrap(), "\"hybrid\"");
        let kind: QueryKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(kind, QueryKind::Text);
    }

    #[test]
    fn test_vector_query_rejects_null_vector() {
        assert!(VectorQuery::new(Vector::null()).is_err());
        assert!(VectorQuery::new(vector()).is_ok());
    }

    #[test]
    fn test_text_query_single_and_many() {
        let single = TextQuery::new("hello");
        assert_eq!(single.texts(), ["hello".to_string()]);
        assert_eq!(single.text(), "hello");

        let many = TextQuery::with_texts(["hello", "world"]).unwrap();
        assert_eq!(many.texts().len(), 2);
        assert_eq!(many.text(), "hello world");
    }

    #[test]
    fn test_text_query_empty_rejected() {
        assert!(TextQuery::with_texts(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_hybrid_query_ratio_bounds() {
        assert!(HybridQuery::new(vector(), "x", 0.0).is_ok());
        assert!(HybridQuery::new(vector(), "x", 1.0).is_ok());
        assert!(HybridQuery::new(vector(), "x", -0.01).is_err());
        assert!(HybridQuery::new(vector(), "x", 1.01).is_err());
        assert!(HybridQuery::new(vector(), "x", 1.5).is_err());
        assert!(HybridQuery::new(vector(), "x", f32::NAN).is_err());
    }

    #[test]
    fn test_hybrid_query_ratio_error_is_invalid_argument() {
        let err = HybridQuery::new(vector(), "x", 1.5).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_hybrid_query_keyword_ratio() {
        let query = HybridQuery::new(vector(), "x", 0.75).unwrap();
        assert_eq!(query.semantic_ratio(), 0.75);
        assert!((query.keyword_ratio() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hybrid_query_rejects_null_vector() {
        assert!(HybridQuery::new(Vector::null(), "x", 0.5).is_err());
    }

    #[test]
    fn test_query_kind_and_filter() {
        let filter = Filter::equal("lang", "en");
        let query: Query = TextQuery::new("hello").with_filter(filter.clone()).into();
        assert_eq!(query.kind(), QueryKind::Text);
        assert_eq!(query.filter(), Some(&filter));

        let query: Query = VectorQuery::new(vector()).unwrap().into();
        assert_eq!(query.kind(), QueryKind::Vector);
        assert!(query.filter().is_none());

        let query: Query = HybridQuery::new(vector(), "x", 0.5).unwrap().into();
        assert_eq!(query.kind(), QueryKind::Hybrid);
    }
}
