//! Documents and their metadata.
//!
//! [`TextDocument`] is the unit of ingestion: raw content waiting to be
//! embedded. [`VectorDocument`] is the unit of storage and retrieval: an id,
//! an embedding (or the null vector), a metadata bag and, on query results
//! only, a score.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::vector::Vector;

// ============================================================================
// Metadata
// ============================================================================

/// Arbitrary key/value metadata attached to a document.
///
/// A few keys are reserved: [`Metadata::KEY_TEXT`] holds the source text
/// that text and hybrid queries match against, [`Metadata::KEY_SOURCE`]
/// records where a document was loaded from and
/// [`Metadata::KEY_PARENT_ID`] links a chunk to the document it was split
/// from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(HashMap<String, Value>);

impl Metadata {
    /// Reserved key for the document's source text.
    pub const KEY_TEXT: &'static str = "_text";

    /// Reserved key for the document's origin (file path, URL, ...).
    pub const KEY_SOURCE: &'static str = "_source";

    /// Reserved key for the id of the parent document of a chunk.
    pub const KEY_PARENT_ID: &'static str = "_parent_id";

    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key/value pair.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a key/value pair, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The source text, if present and a string.
    pub fn text(&self) -> Option<&str> {
        self.get(Self::KEY_TEXT).and_then(Value::as_str)
    }

    /// Set the source text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.insert(Self::KEY_TEXT, text.into());
    }

    /// Set the source text (builder form).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// The document origin, if present and a string.
    pub fn source(&self) -> Option<&str> {
        self.get(Self::KEY_SOURCE).and_then(Value::as_str)
    }

    /// Set the document origin.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.insert(Self::KEY_SOURCE, source.into());
    }

    /// The parent document id, if present and a string.
    pub fn parent_id(&self) -> Option<&str> {
        self.get(Self::KEY_PARENT_ID).and_then(Value::as_str)
    }

    /// Set the parent document id.
    pub fn set_parent_id(&mut self, parent_id: impl Into<String>) {
        self.insert(Self::KEY_PARENT_ID, parent_id.into());
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A stored document: id, embedding, metadata and an optional score.
///
/// The score is `None` on ingestion. Queries return new documents carrying
/// a score and never touch the stored instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    /// Caller-defined identifier, unique within a store's active set.
    pub id: String,

    /// The embedding, or the null vector when none is available.
    pub vector: Vector,

    /// Arbitrary metadata, including the reserved source-text key.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,

    /// Ranking score, populated only on query results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl VectorDocument {
    /// Create a new document without a score.
    pub fn new(id: impl Into<String>, vector: Vector) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: Metadata::new(),
            score: None,
        }
    }

    /// Create a document with a random UUID v4 id.
    pub fn with_random_id(vector: Vector) -> Self {
        Self::new(Uuid::new_v4().to_string(), vector)
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the source-text metadata entry.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.metadata.set_text(text);
        self
    }

    /// Copy of this document carrying `score`.
    pub fn scored(&self, score: Option<f32>) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }

    /// The source text, if any.
    pub fn text(&self) -> Option<&str> {
        self.metadata.text()
    }
}

/// A document waiting to be embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDocument {
    /// Caller-defined identifier.
    pub id: String,

    /// Content to embed.
    pub content: String,

    /// Metadata carried over to the resulting [`VectorDocument`].
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl TextDocument {
    /// Create a new text document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `content` is blank.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(Error::invalid_argument(
                "text document content must not be blank",
            ));
        }
        Ok(Self {
            id: id.into(),
            content,
            metadata: Metadata::new(),
        })
    }

    /// Create a text document with a random UUID v4 id.
    pub fn with_random_id(content: impl Into<String>) -> Result<Self> {
        Self::new(Uuid::new_v4().to_string(), content)
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Pair this document with its embedding.
    ///
    /// The content becomes the source text unless the metadata already
    /// names one.
    pub fn into_vector_document(self, vector: Vector) -> VectorDocument {
        let mut metadata = self.metadata;
        if metadata.text().is_none() {
            metadata.set_text(self.content);
        }
        VectorDocument::new(self.id, vector).with_metadata(metadata)
    }
}

// ============================================================================
// Tests
// ============================================================================
