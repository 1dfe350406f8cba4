//! Vectorizer trait and mock implementation.
//!
//! A [`Vectorizer`] turns text into a [`Vector`]. Model choice and hosting
//! live outside this crate; the retriever and indexer only see the trait.
//!
//! # Implementations
//!
//! - [`MockVectorizer`]: deterministic unit vectors derived from text bytes

use async_trait::async_trait;
use quarry_core::{Error, Result};

use crate::document::{TextDocument, VectorDocument};
use crate::vector::Vector;

/// Trait for turning text into embedding vectors.
///
/// Implementations wrap a specific embedding backend and provide a uniform
/// async interface. The trait requires `Send + Sync` so a vectorizer can be
/// shared behind an `Arc` across tasks.
#[async_trait]
pub trait Vectorizer: Send + Sync {
    /// Embed a single text.
    async fn vectorize(&self, text: &str) -> Result<Vector>;

    /// Embed a batch of texts, in order.
    ///
    /// Default implementation calls `vectorize` for each text sequentially.
    /// Backends with native batching should override this.
    async fn vectorize_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.vectorize(text).await?);
        }
        Ok(vectors)
    }

    /// Embed text documents, keeping their ids and metadata.
    ///
    /// Each resulting document records its content as source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] when the batch yields a different number
    /// of vectors than there are documents.
    async fn vectorize_documents(
        &self,
        documents: Vec<TextDocument>,
    ) -> Result<Vec<VectorDocument>> {
        let vectors = {
            let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
            self.vectorize_batch(&texts).await?
        };
        if vectors.len() != documents.len() {
            return Err(Error::embedding(format!(
                "{} returned {} vector(s) for {} document(s)",
                self.name(),
                vectors.len(),
                documents.len()
            )));
        }
        Ok(documents
            .into_iter()
            .zip(vectors)
            .map(|(document, vector)| document.into_vector_document(vector))
            .collect())
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The vectorizer name for diagnostics.
    fn name(&self) -> &str;
}

/// A mock vectorizer for testing and offline use.
///
/// Each component is derived from the text bytes, so the same input always
/// yields the same unit vector.
#[derive(Debug, Clone)]
pub struct MockVectorizer {
    dimension: usize,
}

impl MockVectorizer {
    /// Create a mock vectorizer producing `dimension`-length vectors.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| {
                let byte = bytes.get(i % bytes.len().max(1)).copied().unwrap_or(0);
                ((byte as f32 + i as f32) % 256.0) / 256.0
            })
            .collect();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl Vectorizer for MockVectorizer {
    async fn vectorize(&self, text: &str) -> Result<Vector> {
        Vector::new(self.deterministic_embedding(text))
    }

    async fn vectorize_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        texts
            .iter()
            .map(|text| Vector::new(self.deterministic_embedding(text)))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================
