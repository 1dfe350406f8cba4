//! Text-to-results orchestration.
//!
//! The [`Retriever`] turns a free-text query into the most capable query
//! shape its store supports, runs it and collects the ranked documents.
//!
//! # Query shape
//!
//! The first matching rule wins:
//!
//! 1. No vectorizer configured: [`TextQuery`]
//! 2. Store cannot run vector queries: [`TextQuery`], the vectorizer is not called
//! 3. Store runs hybrid queries: [`HybridQuery`] with the option's semantic
//!    ratio, falling back to the retriever default
//! 4. Otherwise: [`VectorQuery`]
//!
//! Vectorizer and store errors are returned unchanged.

use quarry_core::Result;
use std::fmt;
use std::sync::Arc;

use crate::document::VectorDocument;
use crate::query::{
    DEFAULT_SEMANTIC_RATIO, HybridQuery, Query, QueryKind, TextQuery, VectorQuery,
};
use crate::store::{QueryOptions, Store};
use crate::vectorizer::Vectorizer;

/// Runs free-text queries against a store.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn Store>,
    vectorizer: Option<Arc<dyn Vectorizer>>,
    default_semantic_ratio: f32,
}

impl Retriever {
    /// Create a text-only retriever over `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            vectorizer: None,
            default_semantic_ratio: DEFAULT_SEMANTIC_RATIO,
        }
    }

    /// Embed queries with `vectorizer` when the store can use vectors.
    pub fn with_vectorizer(mut self, vectorizer: Arc<dyn Vectorizer>) -> Self {
        self.vectorizer = Some(vectorizer);
        self
    }

    /// Semantic ratio used for hybrid queries when the options carry none.
    pub fn with_default_semantic_ratio(mut self, ratio: f32) -> Self {
        self.default_semantic_ratio = ratio;
        self
    }

    /// The store queried by this retriever.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Retrieve documents relevant to `query`.
    ///
    /// # Errors
    ///
    /// Propagates vectorizer failures, query construction errors (such as
    /// an out-of-range semantic ratio) and store failures.
    pub async fn retrieve(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> Result<Vec<VectorDocument>> {
        let shaped = self.build_query(query, options).await?;
        let documents: Vec<VectorDocument> = self.store.query(&shaped, options)?.collect();

        log::debug!(
            "Retrieved {} document(s) from store {} with a {} query",
            documents.len(),
            self.store.name(),
            shaped.kind()
        );
        Ok(documents)
    }

    /// Choose the query shape for `query`, embedding it when needed.
    pub async fn build_query(&self, query: &str, options: &QueryOptions) -> Result<Query> {
        let Some(vectorizer) = &self.vectorizer else {
            log::debug!("No vectorizer configured, using a text query");
            return Ok(TextQuery::new(query).into());
        };

        if !self.store.supports(QueryKind::Vector) {
            log::debug!(
                "Store {} does not support vector queries, using a text query",
                self.store.name()
            );
            return Ok(TextQuery::new(query).into());
        }

        log::debug!("Vectorizing query with {}", vectorizer.name());
        let vector = vectorizer.vectorize(query).await?;

        if self.store.supports(QueryKind::Hybrid) {
            let ratio = options
                .semantic_ratio
                .unwrap_or(self.default_semantic_ratio);
            log::debug!(
                "Store {} supports hybrid queries, using semantic ratio {ratio}",
                self.store.name()
            );
            return Ok(HybridQuery::new(vector, query, ratio)?.into());
        }

        log::debug!("Using a vector query against store {}", self.store.name());
        Ok(VectorQuery::new(vector)?.into())
    }
}

impl fmt::Debug for Retriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriever")
            .field("store", &self.store.name())
            .field("vectorizer", &self.vectorizer.as_ref().map(|v| v.name()))
            .field("default_semantic_ratio", &self.default_semantic_ratio)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
