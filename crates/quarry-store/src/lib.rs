//! Document stores, vector ranking and retrieval for Quarry.
//!
//! This crate holds the retrieval core: embedding vectors with a null
//! sentinel, the three query shapes, distance-based top-K ranking, the
//! capability-negotiating [`Store`] contract with in-memory and cache
//! implementations, and the [`Retriever`] that picks a query shape for a
//! store. The ingestion side (loaders, transformers, indexer) feeds the
//! same stores.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      quarry-store                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Vector / VectorDocument / Metadata / Filter                │
//! │  Query: VectorQuery | TextQuery | HybridQuery               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  DistanceCalculator (top-K, higher score first)             │
//! │  merge_hybrid (vector-first, dedup by id)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Store trait / ManagedStore trait                           │
//! │  ├── InMemoryStore                                          │
//! │  └── CacheStore (JSON snapshot)                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Vectorizer trait ── MockVectorizer                         │
//! │  Retriever (text → best supported query shape)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Loader → Transformer* → Indexer → Store                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry_store::{
//!     InMemoryStore, Indexer, MockVectorizer, QueryOptions, Retriever, TextDocument,
//! };
//! use std::sync::Arc;
//!
//! let vectorizer = Arc::new(MockVectorizer::new(384));
//! let mut store = InMemoryStore::new();
//!
//! Indexer::new(vectorizer.clone())
//!     .index(vec![TextDocument::new("intro", "Ownership in Rust")?], &mut store)
//!     .await?;
//!
//! let retriever = Retriever::new(Arc::new(store)).with_vectorizer(vectorizer);
//! let results = retriever
//!     .retrieve("ownership", &QueryOptions::new().with_max_items(5))
//!     .await?;
//! for document in results {
//!     println!("{}: {:?}", document.id, document.score);
//! }
//! ```

// Data model
pub mod document;
pub mod filter;
pub mod query;
pub mod types;
pub mod vector;

// Ranking and stores
pub mod distance;
pub mod hybrid;
pub mod store;

// Retrieval
pub mod retriever;
pub mod vectorizer;

// Ingestion
pub mod indexer;
pub mod loader;
pub mod transform;

// Re-exports: data model
pub use document::{Metadata, TextDocument, VectorDocument};
pub use filter::Filter;
pub use query::{DEFAULT_SEMANTIC_RATIO, HybridQuery, Query, QueryKind, TextQuery, VectorQuery};
pub use types::StoreConfig;
pub use vector::Vector;

// Re-exports: ranking and stores
pub use distance::{DistanceCalculator, DistanceStrategy};
pub use hybrid::merge_hybrid;
pub use store::{
    CacheSnapshot, CacheStore, DocumentIter, DocumentPredicate, InMemoryStore, ManagedStore,
    QueryOptions, RemoveOptions, Store,
};

// Re-exports: retrieval
pub use retriever::Retriever;
pub use vectorizer::{MockVectorizer, Vectorizer};

// Re-exports: ingestion
pub use indexer::{IndexStats, Indexer};
pub use loader::{InMemoryLoader, Loader, TextFileLoader};
pub use transform::{TextSplitTransformer, TextTrimTransformer, Transformer};
