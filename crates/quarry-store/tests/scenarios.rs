//! End-to-end retrieval scenarios against the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quarry_core::{Error, Result};
use quarry_store::{
    CacheStore, DistanceCalculator, DocumentIter, HybridQuery, InMemoryStore, Indexer,
    ManagedStore, MockVectorizer, Query, QueryKind, QueryOptions, RemoveOptions, Retriever, Store,
    TextDocument, TextQuery, TextSplitTransformer, Vector, VectorDocument, VectorQuery, Vectorizer,
};

fn vector(data: &[f32]) -> Vector {
    Vector::new(data.to_vec()).unwrap()
}

fn abc_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store
        .add(vec![
            VectorDocument::new("A", vector(&[1.0, 0.0, 0.0])),
            VectorDocument::new("B", vector(&[0.0, 1.0, 0.0])),
            VectorDocument::new("C", vector(&[0.0, 0.0, 1.0])),
        ])
        .unwrap();
    store
}

fn abcde_store() -> InMemoryStore {
    let mut store = abc_store();
    store
        .add(vec![
            VectorDocument::new("D", Vector::null()).with_text("hello world"),
            VectorDocument::new("E", Vector::null()).with_text("goodbye"),
        ])
        .unwrap();
    store
}

fn run(store: &dyn Store, query: impl Into<Query>, options: &QueryOptions) -> Vec<VectorDocument> {
    store.query(&query.into(), options).unwrap().collect()
}

fn ids(documents: &[VectorDocument]) -> Vec<&str> {
    documents.iter().map(|d| d.id.as_str()).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_vector_query_orders_ties_by_insertion() {
    let results = run(
        &abc_store(),
        VectorQuery::new(vector(&[0.0, 0.0, 1.0])).unwrap(),
        &QueryOptions::new(),
    );

    assert_eq!(ids(&results), ["C", "A", "B"]);
    assert!((results[0].score.unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(results[1].score, results[2].score);
}

#[test]
fn test_vector_query_max_items() {
    let results = run(
        &abc_store(),
        VectorQuery::new(vector(&[0.0, 0.0, 1.0])).unwrap(),
        &QueryOptions::new().with_max_items(1),
    );
    assert_eq!(ids(&results), ["C"]);
}

#[test]
fn test_vector_query_huge_max_items() {
    let mut store = InMemoryStore::new();
    store
        .add(vec![VectorDocument::new("only", vector(&[1.0, 0.0]))])
        .unwrap();

    for limit in [usize::MAX, 1 << 40] {
        let results = run(
            &store,
            VectorQuery::new(vector(&[1.0, 0.0])).unwrap(),
            &QueryOptions::new().with_max_items(limit),
        );
        assert_eq!(ids(&results), ["only"], "limit {limit}");
    }
}

#[test]
fn test_text_query_unscored() {
    let results = run(&abcde_store(), TextQuery::new("hello"), &QueryOptions::new());

    assert_eq!(ids(&results), ["D"]);
    assert!(results[0].score.is_none());
}

#[test]
fn test_hybrid_query_distinct_ids() {
    let query = HybridQuery::new(vector(&[0.0, 0.0, 1.0]), "hello", 0.5).unwrap();
    let results = run(&abcde_store(), query, &QueryOptions::new());

    let c = results.iter().find(|d| d.id == "C").unwrap();
    let d = results.iter().find(|d| d.id == "D").unwrap();
    assert!((c.score.unwrap() - 0.5).abs() < 1e-6);
    assert!(d.score.is_none());
}

#[test]
fn test_remove_nonexistent_id() {
    let mut store = abc_store();
    store
        .remove(&["nonexistent-id"], &RemoveOptions::default())
        .unwrap();
    assert_eq!(store.len(), 3);
}

#[test]
fn test_hybrid_ratio_out_of_range() {
    let err = HybridQuery::new(vector(&[1.0]), "x", 1.5).unwrap_err();
    assert!(err.is_invalid_argument());
}

// ============================================================================
// Exclusion and validation
// ============================================================================

#[test]
fn test_null_vectors_never_ranked() {
    let store = abcde_store();
    for max_items in [None, Some(1), Some(10)] {
        let mut options = QueryOptions::new();
        options.max_items = max_items;
        let results = run(&store, VectorQuery::new(vector(&[1.0, 1.0, 1.0])).unwrap(), &options);
        assert!(results.iter().all(|d| d.id != "D" && d.id != "E"));
    }
}

#[test]
fn test_mismatched_dimensions_never_ranked() {
    let mut store = abc_store();
    store
        .add(vec![VectorDocument::new("short", vector(&[1.0, 0.0]))])
        .unwrap();

    let results = run(
        &store,
        VectorQuery::new(vector(&[1.0, 0.0, 0.0])).unwrap(),
        &QueryOptions::new(),
    );
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|d| d.id != "short"));
}

#[test]
fn test_hybrid_shared_id_keeps_vector_score() {
    let mut store = InMemoryStore::new();
    store
        .add(vec![
            VectorDocument::new("shared", vector(&[0.0, 1.0])).with_text("hello"),
        ])
        .unwrap();

    let query = HybridQuery::new(vector(&[0.0, 1.0]), "hello", 0.3).unwrap();
    let results = run(&store, query, &QueryOptions::new());

    assert_eq!(results.len(), 1);
    assert!((results[0].score.unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn test_hybrid_ratio_bounds() {
    let v = vector(&[1.0]);
    assert!(HybridQuery::new(v.clone(), "x", -0.01).is_err());
    assert!(HybridQuery::new(v.clone(), "x", 1.01).is_err());
    assert!(HybridQuery::new(v.clone(), "x", 0.0).is_ok());
    assert!(HybridQuery::new(v, "x", 1.0).is_ok());
}

// ============================================================================
// Retriever capability fallback
// ============================================================================

struct TextOnlyStore(InMemoryStore);

impl Store for TextOnlyStore {
    fn name(&self) -> &str {
        "text-only"
    }

    fn add(&mut self, documents: Vec<VectorDocument>) -> Result<()> {
        self.0.add(documents)
    }

    fn remove(&mut self, ids: &[&str], options: &RemoveOptions) -> Result<()> {
        self.0.remove(ids, options)
    }

    fn supports(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Text
    }

    fn query<'a>(&'a self, query: &Query, options: &QueryOptions) -> Result<DocumentIter<'a>> {
        if !self.supports(query.kind()) {
            return Err(Error::unsupported_query(query.kind(), self.name()));
        }
        self.0.query(query, options)
    }
}

struct CountingVectorizer(AtomicUsize);

#[async_trait]
impl Vectorizer for CountingVectorizer {
    async fn vectorize(&self, _text: &str) -> Result<Vector> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Vector::new(vec![1.0, 0.0, 0.0])
    }

    fn dimension(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_retriever_falls_back_to_text_without_vectorizing() {
    let store = Arc::new(TextOnlyStore(abcde_store()));
    let vectorizer = Arc::new(CountingVectorizer(AtomicUsize::new(0)));
    let retriever = Retriever::new(store).with_vectorizer(vectorizer.clone());

    let results =
        tokio_test::block_on(retriever.retrieve("goodbye", &QueryOptions::new())).unwrap();

    assert_eq!(ids(&results), ["E"]);
    assert_eq!(vectorizer.0.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Ingest and retrieve
// ============================================================================

#[tokio::test]
async fn test_index_then_retrieve_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let vectorizer = Arc::new(MockVectorizer::new(16));

    let mut store = CacheStore::open(&path, DistanceCalculator::default()).unwrap();
    store.setup().unwrap();

    let documents = vec![
        TextDocument::new("borrow", "The borrow checker validates references").unwrap(),
        TextDocument::new("async", "Futures are polled by an executor").unwrap(),
        TextDocument::new("long", "lifetimes ".repeat(30)).unwrap(),
    ];
    let stats = Indexer::new(vectorizer.clone())
        .with_transformer(TextSplitTransformer::new(100, 10).unwrap())
        .index(documents, &mut store)
        .await
        .unwrap();
    assert_eq!(stats.documents_loaded, 3);
    assert!(stats.documents_indexed > 3);

    // Reopen from disk and retrieve.
    let reopened = CacheStore::open(&path, DistanceCalculator::default()).unwrap();
    assert_eq!(reopened.len(), stats.documents_indexed);

    let retriever = Retriever::new(Arc::new(reopened)).with_vectorizer(vectorizer);
    let results = retriever
        .retrieve(
            "The borrow checker validates references",
            &QueryOptions::new().with_max_items(3),
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, "borrow");
}
