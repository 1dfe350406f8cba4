//! Handler functions for store CLI commands.
//!
//! These functions implement `index`, `query`, `remove`, `drop` and `stats`
//! against the [`CacheStore`] snapshot named by the configuration.

use crate::config::QuarryConfig;
use quarry_core::{Error, Result};
use quarry_store::{
    CacheStore, Filter, IndexStats, Indexer, ManagedStore, MockVectorizer, QueryOptions,
    RemoveOptions, Retriever, Store, TextFileLoader, TextSplitTransformer, TextTrimTransformer,
    VectorDocument,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Characters of document text shown per result in plain output.
const SNIPPET_CHARS: usize = 80;

// ============================================================================
// Option types
// ============================================================================

/// Options for `quarry index`.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Files or directories to load.
    pub paths: Vec<String>,
    /// Keep each file as one document.
    pub no_split: bool,
    /// Batch size override.
    pub batch_size: Option<usize>,
    /// Extensions accepted when walking directories.
    pub extensions: Vec<String>,
}

/// Options for `quarry query`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Query text.
    pub text: String,
    /// Result cap override.
    pub limit: Option<usize>,
    /// Hybrid semantic ratio override.
    pub ratio: Option<f32>,
    /// Skip the vectorizer so only keyword matching runs.
    pub text_only: bool,
    /// `key=value` metadata conditions, all of which must hold.
    pub conditions: Vec<String>,
    /// Emit JSON instead of plain text.
    pub json: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn open_store(config: &QuarryConfig) -> Result<CacheStore> {
    let path = config.cache_path()?;
    log::debug!("Opening cache store at {}", path.display());
    CacheStore::open(path, config.store.calculator())
}

/// Parse a `key=value` condition into an equality filter.
///
/// The value is read as JSON when it parses (`2024`, `true`), else as a string.
pub fn parse_condition(condition: &str) -> Result<Filter> {
    let (key, raw) = condition.split_once('=').ok_or_else(|| {
        Error::invalid_argument(format!("condition '{condition}' is not KEY=VALUE"))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_argument(format!(
            "condition '{condition}' has an empty key"
        )));
    }
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
    Ok(Filter::equal(key, value))
}

/// Combine conditions into one conjunctive filter; `None` when there are none.
pub fn build_filter(conditions: &[String]) -> Result<Option<Filter>> {
    if conditions.is_empty() {
        return Ok(None);
    }
    let filters = conditions
        .iter()
        .map(|c| parse_condition(c))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Filter::and(filters)))
}

fn snippet(document: &VectorDocument) -> String {
    let text = document.text().unwrap_or_default().replace('\n', " ");
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn result_json(document: &VectorDocument) -> Value {
    json!({
        "id": document.id,
        "score": document.score,
        "text": document.text(),
        "metadata": document.metadata,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Load, split, vectorize and store every path in `options`.
pub async fn handle_index(config: &QuarryConfig, options: IndexOptions) -> Result<IndexStats> {
    let settings = &config.store;
    let mut store = open_store(config)?;
    store.setup()?;

    let vectorizer = Arc::new(MockVectorizer::new(settings.dimension));
    let mut indexer = Indexer::new(vectorizer)
        .with_batch_size(options.batch_size.unwrap_or(settings.batch_size))?
        .with_transformer(TextTrimTransformer);
    if !options.no_split {
        indexer = indexer.with_transformer(TextSplitTransformer::new(
            settings.chunk_size,
            settings.chunk_overlap,
        )?);
    }
    let loader = TextFileLoader::new().with_extensions(options.extensions);

    let mut total = IndexStats::default();
    for path in &options.paths {
        let stats = indexer.index_from(&loader, path, &mut store).await?;
        println!(
            "{path}: {} document(s) loaded, {} indexed",
            stats.documents_loaded, stats.documents_indexed
        );
        total.documents_loaded += stats.documents_loaded;
        total.documents_indexed += stats.documents_indexed;
        total.batches += stats.batches;
        total.duration_ms += stats.duration_ms;
    }

    println!("Index updated:");
    println!("  Documents loaded:  {}", total.documents_loaded);
    println!("  Documents indexed: {}", total.documents_indexed);
    println!("  Batches:           {}", total.batches);
    println!("  Store size:        {}", store.len());
    println!("  Cache file:        {}", store.path().display());
    Ok(total)
}

/// Retrieve documents for `options.text` and print them.
pub async fn handle_query(
    config: &QuarryConfig,
    options: SearchOptions,
) -> Result<Vec<VectorDocument>> {
    let settings = &config.store;
    let store = open_store(config)?;
    if store.is_empty() {
        log::warn!("Cache store at {} is empty", store.path().display());
    }

    let mut retriever =
        Retriever::new(Arc::new(store)).with_default_semantic_ratio(settings.semantic_ratio);
    if !options.text_only {
        retriever = retriever.with_vectorizer(Arc::new(MockVectorizer::new(settings.dimension)));
    }

    let mut query_options =
        QueryOptions::new().with_max_items(options.limit.unwrap_or(settings.default_limit));
    if let Some(ratio) = options.ratio {
        query_options = query_options.with_semantic_ratio(ratio);
    }
    if let Some(filter) = build_filter(&options.conditions)? {
        query_options = query_options.with_filter(move |d| filter.matches(&d.metadata));
    }

    let results = retriever.retrieve(&options.text, &query_options).await?;

    if options.json {
        let rendered: Vec<Value> = results.iter().map(result_json).collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else if results.is_empty() {
        println!("No results.");
    } else {
        for (rank, document) in results.iter().enumerate() {
            let score = document
                .score
                .map_or_else(|| "-".to_string(), |s| format!("{s:.4}"));
            println!("{:>3}. {} [{score}] {}", rank + 1, document.id, snippet(document));
        }
    }
    Ok(results)
}

/// Remove documents by id.
pub fn handle_remove(config: &QuarryConfig, ids: &[String]) -> Result<()> {
    let mut store = open_store(config)?;
    let before = store.len();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    store.remove(&ids, &RemoveOptions::default())?;
    println!("Removed {} document(s)", before - store.len());
    Ok(())
}

/// Delete every document along with the cache file.
pub fn handle_drop(config: &QuarryConfig) -> Result<()> {
    let mut store = open_store(config)?;
    let count = store.len();
    ManagedStore::drop(&mut store)?;
    println!(
        "Dropped {count} document(s); removed {}",
        store.path().display()
    );
    Ok(())
}

/// Print store statistics.
pub fn handle_stats(config: &QuarryConfig) -> Result<()> {
    let store = open_store(config)?;
    let documents = store.documents();

    let null_vectors = documents.iter().filter(|d| d.vector.is_null()).count();
    let with_text = documents.iter().filter(|d| d.text().is_some()).count();
    let dimensions: BTreeSet<usize> = documents
        .iter()
        .filter_map(|d| d.vector.dimensions())
        .collect();
    let sources: BTreeSet<&str> = documents
        .iter()
        .filter_map(|d| d.metadata.source())
        .collect();

    println!("Store statistics:");
    println!("  Cache file:      {}", store.path().display());
    println!("  Distance:        {:?}", config.store.distance);
    println!("  Documents:       {}", store.len());
    println!("  With text:       {with_text}");
    println!("  Null vectors:    {null_vectors}");
    println!("  Sources:         {}", sources.len());
    if !dimensions.is_empty() {
        let dimensions: Vec<String> = dimensions.iter().map(ToString::to_string).collect();
        println!("  Dimensions:      {}", dimensions.join(", "));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
