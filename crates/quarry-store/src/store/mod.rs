//! The store contract and its in-process implementations.
//!
//! A [`Store`] holds [`VectorDocument`]s and executes [`Query`]s against
//! them. Stores negotiate capabilities through [`Store::supports`]; asking a
//! store for a query kind it does not support fails with
//! [`Error::UnsupportedQuery`](quarry_core::Error::UnsupportedQuery).
//!
//! # Implementations
//!
//! - [`InMemoryStore`]: documents held in a `Vec`, reference semantics
//! - [`CacheStore`]: the same semantics, persisted to a JSON snapshot file

pub mod cache;
pub mod memory;

pub use cache::{CacheSnapshot, CacheStore};
pub use memory::InMemoryStore;

use quarry_core::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::document::VectorDocument;
use crate::query::{Query, QueryKind};

/// Lazy sequence of query results.
///
/// Stopping early is cheap: nothing beyond what was pulled is produced.
pub type DocumentIter<'a> = Box<dyn Iterator<Item = VectorDocument> + 'a>;

/// In-process predicate over candidate documents.
pub type DocumentPredicate = Arc<dyn Fn(&VectorDocument) -> bool + Send + Sync>;

// ============================================================================
// Options
// ============================================================================

/// Options for [`Store::query`] and [`Retriever::retrieve`](crate::Retriever::retrieve).
///
/// Unknown vendor-specific options go into `extra`; in-process stores
/// ignore them.
#[derive(Clone, Default)]
pub struct QueryOptions {
    /// Cap on the number of returned documents.
    pub max_items: Option<usize>,

    /// Predicate a document must satisfy to be returned.
    pub filter: Option<DocumentPredicate>,

    /// Weight of the vector score when the retriever builds a hybrid query.
    pub semantic_ratio: Option<f32>,

    /// Backend-specific options, passed through untouched.
    pub extra: HashMap<String, Value>,
}

impl QueryOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of results.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Only return documents satisfying `filter`.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&VectorDocument) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Set the hybrid semantic ratio.
    pub fn with_semantic_ratio(mut self, semantic_ratio: f32) -> Self {
        self.semantic_ratio = Some(semantic_ratio);
        self
    }

    /// Add a backend-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether `document` passes the predicate (true without one).
    pub fn accepts(&self, document: &VectorDocument) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(document))
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("max_items", &self.max_items)
            .field("filter", &self.filter.as_ref().map(|_| "<predicate>"))
            .field("semantic_ratio", &self.semantic_ratio)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Options for [`Store::remove`].
///
/// In-process stores accept and ignore backend-specific entries.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Backend-specific options, passed through untouched.
    pub extra: HashMap<String, Value>,
}

// ============================================================================
// Traits
// ============================================================================

/// A capability-negotiating collection of [`VectorDocument`]s.
///
/// Mutation takes `&mut self`; queries borrow the store for as long as the
/// returned iterator lives, so a store cannot change under an in-flight
/// query.
pub trait Store: Send + Sync {
    /// Store name for diagnostics and error messages.
    fn name(&self) -> &str;

    /// Add documents. Ids are not deduplicated.
    fn add(&mut self, documents: Vec<VectorDocument>) -> Result<()>;

    /// Remove every document whose id is in `ids`. Unknown ids are ignored.
    fn remove(&mut self, ids: &[&str], options: &RemoveOptions) -> Result<()>;

    /// Whether this store can execute queries of `kind`.
    fn supports(&self, kind: QueryKind) -> bool;

    /// Execute `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedQuery`](quarry_core::Error::UnsupportedQuery)
    /// when [`Store::supports`] is false for the query's kind.
    fn query<'a>(&'a self, query: &Query, options: &QueryOptions) -> Result<DocumentIter<'a>>;
}

/// A store whose backing resources have a lifecycle.
pub trait ManagedStore: Store {
    /// Create the backing resources if they do not exist yet.
    fn setup(&mut self) -> Result<()>;

    /// Remove all documents and release the backing resources.
    fn drop(&mut self) -> Result<()>;
}
