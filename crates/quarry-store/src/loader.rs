//! Document loaders.
//!
//! A [`Loader`] turns a source identifier into [`TextDocument`]s ready to be
//! transformed and vectorized.
//!
//! # Loaders
//!
//! - [`InMemoryLoader`]: returns documents built by the caller
//! - [`TextFileLoader`]: reads UTF-8 files, or every matching file under a
//!   directory

use async_trait::async_trait;
use async_walkdir::WalkDir;
use futures::StreamExt;
use quarry_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::document::{Metadata, TextDocument};

/// Trait for producing documents from a source.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Load every document available from `source`.
    async fn load(&self, source: &str) -> Result<Vec<TextDocument>>;
}

// ============================================================================
// InMemoryLoader
// ============================================================================

/// Loader returning a fixed set of documents regardless of source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    documents: Vec<TextDocument>,
}

impl InMemoryLoader {
    /// Create a loader over `documents`.
    pub fn new(documents: Vec<TextDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl Loader for InMemoryLoader {
    async fn load(&self, _source: &str) -> Result<Vec<TextDocument>> {
        Ok(self.documents.clone())
    }
}

// ============================================================================
// TextFileLoader
// ============================================================================

/// Loader reading plain-text files from disk.
///
/// A file source yields one document whose id and `_source` metadata are
/// the path. A directory source is walked recursively and yields one
/// document per file with a matching extension, in path order; blank files
/// found while walking are skipped.
#[derive(Debug, Clone)]
pub struct TextFileLoader {
    extensions: Vec<String>,
}

impl Default for TextFileLoader {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

impl TextFileLoader {
    /// Create a loader accepting `.txt` and `.md` files in directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only these extensions (without dot) when walking directories.
    pub fn with_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Extensions accepted when walking directories.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }

    async fn load_file(&self, path: &Path) -> Result<TextDocument> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(e, path))?;
        if content.trim().is_empty() {
            return Err(Error::invalid_data(format!("{} is empty", path.display())));
        }

        let source = path.display().to_string();
        let mut metadata = Metadata::new();
        metadata.set_source(source.clone());
        Ok(TextDocument::new(source, content)?.with_metadata(metadata))
    }

    async fn load_directory(&self, root: &Path) -> Result<Vec<TextDocument>> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut walker = WalkDir::new(root);

        while let Some(entry_result) = walker.next().await {
            let entry = entry_result
                .map_err(|e| Error::operation(format!("walking {}: {e}", root.display())))?;
            let path = entry.path();
            if path.is_file() && self.accepts(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_file(&path).await {
                Ok(document) => documents.push(document),
                Err(Error::InvalidData(msg)) => log::warn!("Skipping {msg}"),
                Err(e) => return Err(e),
            }
        }

        log::debug!("Loaded {} document(s) from {}", documents.len(), root.display());
        Ok(documents)
    }
}

#[async_trait]
impl Loader for TextFileLoader {
    async fn load(&self, source: &str) -> Result<Vec<TextDocument>> {
        let path = Path::new(source);
        let exists = fs::try_exists(path)
            .await
            .map_err(|e| Error::io_with_path(e, path))?;
        if !exists {
            return Err(Error::not_found("File", source));
        }

        let metadata = fs::metadata(path)
            .await
            .map_err(|e| Error::io_with_path(e, path))?;
        if metadata.is_dir() {
            self.load_directory(path).await
        } else {
            Ok(vec![self.load_file(path).await?])
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_in_memory_loader() {
        let documents = vec![
            TextDocument::new("a", "alpha").unwrap(),
            TextDocument::new("b", "beta").unwrap(),
        ];
        let loader = InMemoryLoader::new(documents.clone());

        assert_eq!(loader.load("ignored").await.unwrap(), documents);
        assert_eq!(loader.load("").await.unwrap(), documents);
    }

    #[tokio::test]
    async fn test_in_memory_loader_empty() {
        let loader = InMemoryLoader::default();
        assert!(loader.load("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_text_file_loader_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "Rust ownership rules").unwrap();
        let source = path.display().to_string();

        let documents = TextFileLoader::new().load(&source).await.unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, source);
        assert_eq!(documents[0].content, "Rust ownership rules");
        assert_eq!(documents[0].metadata.source(), Some(source.as_str()));
    }

    #[tokio::test]
    async fn test_text_file_loader_ignores_extension_for_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.log");
        std::fs::write(&path, "explicit file").unwrap();

        let documents = TextFileLoader::new()
            .load(&path.display().to_string())
            .await
            .unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[tokio::test]
    async fn test_text_file_loader_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        let err = TextFileLoader::new()
            .load(&path.display().to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_text_file_loader_unreadable_path_is_io_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "not a directory").unwrap();
        let below_file = file.join("inner.txt");

        let err = TextFileLoader::new()
            .load(&below_file.display().to_string())
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::IoWithPath { ref path, .. } if *path == below_file));
    }

    #[tokio::test]
    async fn test_text_file_loader_blank_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\t").unwrap();

        let err = TextFileLoader::new()
            .load(&path.display().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_text_file_loader_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.md"), "# Beta").unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("nested").join("c.txt"), "gamma").unwrap();
        std::fs::write(dir.path().join("skip.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();

        let documents = TextFileLoader::new()
            .load(&dir.path().display().to_string())
            .await
            .unwrap();

        let contents: Vec<_> = documents.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, ["alpha", "# Beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_text_file_loader_custom_extensions() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.rst"), "beta").unwrap();

        let loader = TextFileLoader::new().with_extensions(["rst"]);
        assert_eq!(loader.extensions(), ["rst"]);

        let documents = loader.load(&dir.path().display().to_string()).await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].content, "beta");
    }

    #[test]
    fn test_trait_object_safety() {
        fn _assert_object_safe(_: &dyn Loader) {}
    }
}
