//! Ingestion pipeline: load, transform, vectorize, store.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::document::TextDocument;
use crate::loader::Loader;
use crate::store::Store;
use crate::transform::Transformer;
use crate::vectorizer::Vectorizer;

/// Default number of documents vectorized and stored per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Outcome of an indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents handed to the indexer, before transformation.
    pub documents_loaded: usize,
    /// Documents added to the store, after transformation.
    pub documents_indexed: usize,
    /// Number of vectorize-and-add batches.
    pub batches: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

/// Runs documents through transformers and a vectorizer into a store.
pub struct Indexer {
    vectorizer: Arc<dyn Vectorizer>,
    transformers: Vec<Box<dyn Transformer>>,
    batch_size: usize,
}

impl Indexer {
    /// Create an indexer with no transformers.
    pub fn new(vectorizer: Arc<dyn Vectorizer>) -> Self {
        Self {
            vectorizer,
            transformers: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Append a transformer; transformers run in the order added.
    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Set the batch size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch size must be greater than zero"));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Documents per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Load documents from `source` with `loader` and index them.
    pub async fn index_from(
        &self,
        loader: &dyn Loader,
        source: &str,
        store: &mut dyn Store,
    ) -> Result<IndexStats> {
        let documents = loader.load(source).await?;
        log::debug!("Loaded {} document(s) from {source}", documents.len());
        self.index(documents, store).await
    }

    /// Transform, vectorize and add `documents` to `store`.
    ///
    /// Batches already added stay in the store when a later batch fails.
    pub async fn index(
        &self,
        documents: Vec<TextDocument>,
        store: &mut dyn Store,
    ) -> Result<IndexStats> {
        let started = Instant::now();
        let mut stats = IndexStats {
            documents_loaded: documents.len(),
            ..Default::default()
        };

        let mut documents = documents;
        for transformer in &self.transformers {
            documents = transformer.transform(documents)?;
        }

        let mut pending = documents.into_iter().peekable();
        while pending.peek().is_some() {
            let batch: Vec<TextDocument> = pending.by_ref().take(self.batch_size).collect();
            let vectorized = self.vectorizer.vectorize_documents(batch).await?;
            let count = vectorized.len();
            store.add(vectorized)?;

            stats.batches += 1;
            stats.documents_indexed += count;
            log::debug!(
                "Indexed batch {} ({count} document(s)) into {}",
                stats.batches,
                store.name()
            );
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} of {} loaded document(s) in {} batch(es) ({}ms)",
            stats.documents_indexed,
            stats.documents_loaded,
            stats.batches,
            stats.duration_ms
        );
        Ok(stats)
    }
}

impl fmt::Debug for Indexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("vectorizer", &self.vectorizer.name())
            .field("transformers", &self.transformers.len())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VectorDocument;
    use crate::loader::InMemoryLoader;
    use crate::query::{Query, QueryKind, TextQuery};
    use crate::store::{DocumentIter, InMemoryStore, QueryOptions, RemoveOptions};
    use crate::transform::{TextSplitTransformer, TextTrimTransformer};
    use crate::vector::Vector;
    use crate::vectorizer::MockVectorizer;

    fn documents(count: usize) -> Vec<TextDocument> {
        (0..count)
            .map(|i| {
                TextDocument::new(format!("doc-{i}"), format!("document number {i}")).unwrap()
            })
            .collect()
    }

    fn indexer() -> Indexer {
        Indexer::new(Arc::new(MockVectorizer::new(4)))
    }

    #[tokio::test]
    async fn test_index_batches() {
        let mut store = InMemoryStore::new();
        let stats = indexer()
            .with_batch_size(2)
            .unwrap()
            .index(documents(5), &mut store)
            .await
            .unwrap();

        assert_eq!(stats.documents_loaded, 5);
        assert_eq!(stats.documents_indexed, 5);
        assert_eq!(stats.batches, 3);
        assert_eq!(store.len(), 5);
        assert!(store.documents().iter().all(|d| d.vector.dimensions() == Some(4)));
        assert_eq!(store.documents()[4].text(), Some("document number 4"));
    }

    #[tokio::test]
    async fn test_index_default_batch_size() {
        let mut store = InMemoryStore::new();
        let indexer = indexer();
        assert_eq!(indexer.batch_size(), DEFAULT_BATCH_SIZE);

        let stats = indexer.index(documents(51), &mut store).await.unwrap();
        assert_eq!(stats.batches, 2);
    }

    #[tokio::test]
    async fn test_index_nothing() {
        let mut store = InMemoryStore::new();
        let stats = indexer().index(Vec::new(), &mut store).await.unwrap();

        assert_eq!(stats.batches, 0);
        assert_eq!(stats.documents_indexed, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(indexer().with_batch_size(0).unwrap_err().is_invalid_argument());
    }

    #[tokio::test]
    async fn test_index_applies_transformers_in_order() {
        let mut store = InMemoryStore::new();
        let long = TextDocument::new("long", format!("  {}  ", "y".repeat(30))).unwrap();

        let stats = indexer()
            .with_transformer(TextTrimTransformer)
            .with_transformer(TextSplitTransformer::new(10, 0).unwrap())
            .index(vec![long], &mut store)
            .await
            .unwrap();

        assert_eq!(stats.documents_loaded, 1);
        assert_eq!(stats.documents_indexed, 3);
        assert!(store
            .documents()
            .iter()
            .all(|d| d.metadata.parent_id() == Some("long")));
    }

    #[tokio::test]
    async fn test_index_from_loader() {
        let loader = InMemoryLoader::new(documents(3));
        let mut store = InMemoryStore::new();

        let stats = indexer()
            .index_from(&loader, "memory", &mut store)
            .await
            .unwrap();
        assert_eq!(stats.documents_indexed, 3);

        let query = Query::from(TextQuery::new("number 1"));
        let hits: Vec<_> = store.query(&query, &QueryOptions::new()).unwrap().collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "doc-1");
    }

    /// Store that rejects every add.
    struct FailingStore;

    impl Store for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        fn add(&mut self, _documents: Vec<VectorDocument>) -> Result<()> {
            Err(Error::operation("disk full"))
        }

        fn remove(&mut self, _ids: &[&str], _options: &RemoveOptions) -> Result<()> {
            Ok(())
        }

        fn supports(&self, _kind: QueryKind) -> bool {
            false
        }

        fn query<'a>(
            &'a self,
            query: &Query,
            _options: &QueryOptions,
        ) -> Result<DocumentIter<'a>> {
            Err(Error::unsupported_query(query.kind(), self.name()))
        }
    }

    /// Returns one vector fewer than asked for.
    struct ShortBatchVectorizer;

    #[async_trait::async_trait]
    impl Vectorizer for ShortBatchVectorizer {
        async fn vectorize(&self, _text: &str) -> Result<Vector> {
            Vector::new(vec![1.0])
        }

        async fn vectorize_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
            (1..texts.len()).map(|_| Vector::new(vec![1.0])).collect()
        }

        fn dimension(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "short-batch"
        }
    }

    #[tokio::test]
    async fn test_index_short_vectorizer_batch_fails() {
        let mut store = InMemoryStore::new();
        let err = Indexer::new(Arc::new(ShortBatchVectorizer))
            .index(documents(3), &mut store)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Embedding(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_index_store_error_propagates() {
        let err = indexer()
            .index(documents(1), &mut FailingStore)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Operation(_)));
    }
}
