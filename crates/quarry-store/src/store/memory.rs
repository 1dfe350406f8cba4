//! In-memory reference store.
//!
//! Holds documents in insertion order and executes every query kind:
//!
//! - **vector**: candidates go through the [`DistanceCalculator`]
//! - **text**: case-insensitive substring match of any term against the
//!   document's source text, unscored, in insertion order
//! - **hybrid**: both of the above, merged by [`merge_hybrid`]
//!
//! The query's metadata [`Filter`](crate::Filter) is applied to candidates
//! before anything else. The [`QueryOptions`] predicate and `max_items`
//! cap are applied before truncation on the vector and text paths, and to
//! the merged set on the hybrid path.

use quarry_core::{Error, Result};

use super::{DocumentIter, QueryOptions, RemoveOptions, Store};
use crate::distance::DistanceCalculator;
use crate::document::VectorDocument;
use crate::filter::Filter;
use crate::hybrid::merge_hybrid;
use crate::query::{HybridQuery, Query, QueryKind, TextQuery, VectorQuery};

/// Store backed by a `Vec` of documents.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: Vec<VectorDocument>,
    calculator: DistanceCalculator,
}

impl InMemoryStore {
    /// Create an empty store ranking with cosine similarity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store ranking with `calculator`.
    pub fn with_calculator(calculator: DistanceCalculator) -> Self {
        Self {
            documents: Vec::new(),
            calculator,
        }
    }

    /// Create a store holding `documents`.
    pub fn from_documents(documents: Vec<VectorDocument>, calculator: DistanceCalculator) -> Self {
        Self {
            documents,
            calculator,
        }
    }

    /// The stored documents, in insertion order.
    pub fn documents(&self) -> &[VectorDocument] {
        &self.documents
    }

    /// Number of stored documents (duplicates counted).
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Remove every document.
    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// The calculator used for vector ranking.
    pub fn calculator(&self) -> DistanceCalculator {
        self.calculator
    }

    /// Documents passing the query's metadata filter.
    fn candidates(&self, filter: Option<Filter>) -> impl Iterator<Item = &VectorDocument> {
        self.documents.iter().filter(move |document| {
            filter
                .as_ref()
                .is_none_or(|f| f.matches(&document.metadata))
        })
    }

    fn query_vector<'a>(&'a self, query: &VectorQuery, options: &QueryOptions) -> DocumentIter<'a> {
        let candidates = self
            .candidates(query.filter().cloned())
            .filter(|document| options.accepts(document));
        Box::new(
            self.calculator
                .calculate(candidates, query.vector(), options.max_items),
        )
    }

    fn query_text<'a>(&'a self, query: &TextQuery, options: &QueryOptions) -> DocumentIter<'a> {
        let terms = lowercase_terms(query.texts());
        let predicate = options.filter.clone();
        let matches = self
            .candidates(query.filter().cloned())
            .filter(move |document| text_matches(document, &terms))
            .filter(move |document| predicate.as_ref().is_none_or(|p| p(*document)))
            .map(|document| document.scored(None));

        match options.max_items {
            Some(limit) => Box::new(matches.take(limit)),
            None => Box::new(matches),
        }
    }

    fn query_hybrid<'a>(&'a self, query: &HybridQuery, options: &QueryOptions) -> DocumentIter<'a> {
        let vector_results = self
            .calculator
            .calculate(self.candidates(query.filter().cloned()), query.vector(), None);

        let terms = lowercase_terms(query.texts());
        let text_results = self
            .candidates(query.filter().cloned())
            .filter(|document| text_matches(document, &terms))
            .map(|document| document.scored(None));

        let merged = merge_hybrid(vector_results, text_results, query.semantic_ratio());
        let accepted = merged.into_iter().filter(|document| options.accepts(document));
        let limited: Vec<VectorDocument> = match options.max_items {
            Some(limit) => accepted.take(limit).collect(),
            None => accepted.collect(),
        };
        Box::new(limited.into_iter())
    }
}

fn lowercase_terms(texts: &[String]) -> Vec<String> {
    texts.iter().map(|t| t.to_lowercase()).collect()
}

/// Whether any (lowercased) term occurs in the document's source text.
fn text_matches(document: &VectorDocument, terms: &[String]) -> bool {
    let Some(text) = document.text() else {
        return false;
    };
    let text = text.to_lowercase();
    terms.iter().any(|term| text.contains(term.as_str()))
}

impl Store for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn add(&mut self, documents: Vec<VectorDocument>) -> Result<()> {
        log::debug!(
            "Adding {} document(s) to {} store",
            documents.len(),
            self.name()
        );
        self.documents.extend(documents);
        Ok(())
    }

    fn remove(&mut self, ids: &[&str], _options: &RemoveOptions) -> Result<()> {
        let before = self.documents.len();
        self.documents
            .retain(|document| !ids.contains(&document.id.as_str()));
        log::debug!(
            "Removed {} document(s) from {} store",
            before - self.documents.len(),
            self.name()
        );
        Ok(())
    }

    fn supports(&self, kind: QueryKind) -> bool {
        matches!(kind, QueryKind::Vector | QueryKind::Text | QueryKind::Hybrid)
    }

    fn query<'a>(&'a self, query: &Query, options: &QueryOptions) -> Result<DocumentIter<'a>> {
        if !self.supports(query.kind()) {
            return Err(Error::unsupported_query(query.kind(), self.name()));
        }
        Ok(match query {
            Query::Vector(q) => self.query_vector(q, options),
            Query::Text(q) => self.query_text(q, options),
            Query::Hybrid(q) => self.query_hybrid(q, options),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
