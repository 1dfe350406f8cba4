//! Cache-backed store.
//!
//! Same query semantics as [`InMemoryStore`], with the document set
//! persisted as a JSON snapshot so it survives restarts. Every mutation
//! writes the snapshot through; queries never touch the file.

use chrono::{DateTime, Utc};
use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{DocumentIter, InMemoryStore, ManagedStore, QueryOptions, RemoveOptions, Store};
use crate::distance::DistanceCalculator;
use crate::document::VectorDocument;
use crate::query::{Query, QueryKind};

/// On-disk form of a [`CacheStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,

    /// Stored documents, in insertion order.
    #[serde(default)]
    pub documents: Vec<VectorDocument>,
}

impl CacheSnapshot {
    /// Snapshot `documents` now.
    pub fn new(documents: Vec<VectorDocument>) -> Self {
        Self {
            saved_at: Utc::now(),
            documents,
        }
    }
}

/// Save a snapshot to a JSON file.
pub fn save_snapshot(path: &Path, snapshot: &CacheSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
    Ok(())
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<CacheSnapshot> {
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let snapshot: CacheSnapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}

/// Store persisted to a JSON snapshot file.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl CacheStore {
    /// Open the store at `path`.
    ///
    /// Loads the existing snapshot if there is one; otherwise the store
    /// starts empty and the file is created by [`ManagedStore::setup`] or
    /// the first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>, calculator: DistanceCalculator) -> Result<Self> {
        let path = path.into();
        let documents = if path.exists() {
            let snapshot = load_snapshot(&path)?;
            log::debug!(
                "Loaded {} document(s) from cache {} (saved {})",
                snapshot.documents.len(),
                path.display(),
                snapshot.saved_at
            );
            snapshot.documents
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            inner: InMemoryStore::from_documents(documents, calculator),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored documents, in insertion order.
    pub fn documents(&self) -> &[VectorDocument] {
        self.inner.documents()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
            }
        }
        save_snapshot(&self.path, &CacheSnapshot::new(self.inner.documents().to_vec()))
    }
}

impl Store for CacheStore {
    fn name(&self) -> &str {
        "cache"
    }

    fn add(&mut self, documents: Vec<VectorDocument>) -> Result<()> {
        self.inner.add(documents)?;
        self.persist()
    }

    fn remove(&mut self, ids: &[&str], options: &RemoveOptions) -> Result<()> {
        self.inner.remove(ids, options)?;
        self.persist()
    }

    fn supports(&self, kind: QueryKind) -> bool {
        self.inner.supports(kind)
    }

    fn query<'a>(&'a self, query: &Query, options: &QueryOptions) -> Result<DocumentIter<'a>> {
        if !self.supports(query.kind()) {
            return Err(Error::unsupported_query(query.kind(), self.name()));
        }
        self.inner.query(query, options)
    }
}

impl ManagedStore for CacheStore {
    fn setup(&mut self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        log::debug!("Creating cache {}", self.path.display());
        self.persist()
    }

    fn drop(&mut self) -> Result<()> {
        self.inner.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io_with_path(e, &self.path)),
        }
        log::debug!("Dropped cache {}", self.path.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
