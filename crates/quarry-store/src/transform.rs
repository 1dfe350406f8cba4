//! Document transformers applied between loading and vectorizing.
//!
//! # Transformers
//!
//! - [`TextTrimTransformer`]: strips surrounding whitespace
//! - [`TextSplitTransformer`]: splits long documents into overlapping chunks

use quarry_core::{Error, Result};
use uuid::Uuid;

use crate::document::TextDocument;

/// Default chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default number of characters shared by consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Trait for rewriting a batch of documents.
pub trait Transformer: Send + Sync {
    /// Transform `documents`, possibly changing their number.
    fn transform(&self, documents: Vec<TextDocument>) -> Result<Vec<TextDocument>>;
}

/// Trims leading and trailing whitespace from every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTrimTransformer;

impl Transformer for TextTrimTransformer {
    fn transform(&self, documents: Vec<TextDocument>) -> Result<Vec<TextDocument>> {
        Ok(documents
            .into_iter()
            .map(|mut document| {
                let trimmed = document.content.trim();
                if trimmed.len() != document.content.len() {
                    document.content = trimmed.to_string();
                }
                document
            })
            .collect())
    }
}

/// Splits documents longer than `chunk_size` characters into chunks.
///
/// Consecutive chunks share `overlap` characters. Each chunk gets a fresh
/// UUID, the parent's metadata, the parent id under `_parent_id` and its
/// own content under `_text`. Documents that fit in one chunk are returned
/// unchanged; whitespace-only chunks are dropped.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitTransformer {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextSplitTransformer {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSplitTransformer {
    /// Create a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `chunk_size` is zero or
    /// `overlap` is not smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_argument("chunk size must be greater than zero"));
        }
        if overlap >= chunk_size {
            return Err(Error::invalid_argument(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive chunks.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn split(&self, document: TextDocument) -> Vec<TextDocument> {
        let chars: Vec<char> = document.content.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![document];
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(chars.len());
            let content: String = chars[start..end].iter().collect();
            if !content.trim().is_empty() {
                let mut metadata = document.metadata.clone();
                metadata.set_parent_id(document.id.clone());
                metadata.set_text(content.clone());
                chunks.push(TextDocument {
                    id: Uuid::new_v4().to_string(),
                    content,
                    metadata,
                });
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }

        log::debug!("Split document {} into {} chunk(s)", document.id, chunks.len());
        chunks
    }
}

impl Transformer for TextSplitTransformer {
    fn transform(&self, documents: Vec<TextDocument>) -> Result<Vec<TextDocument>> {
        Ok(documents
            .into_iter()
            .flat_map(|document| self.split(document))
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
