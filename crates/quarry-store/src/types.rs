//! Store configuration.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::distance::{DistanceCalculator, DistanceStrategy};
use crate::query::DEFAULT_SEMANTIC_RATIO;

// ============================================================================
// Configuration
// ============================================================================

/// Retrieval and ingestion configuration.
///
/// Every field has a default, so a partial TOML table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Scoring strategy for vector ranking.
    #[serde(default)]
    pub distance: DistanceStrategy,

    /// Semantic ratio for hybrid queries when the caller passes none.
    #[serde(default = "default_semantic_ratio")]
    pub semantic_ratio: f32,

    /// Default number of results returned by a query.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Path to the cache snapshot file.
    pub cache_path: Option<String>,

    /// Embedding dimension of the mock vectorizer.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Number of documents vectorized and stored per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum chunk length in characters when splitting documents.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_semantic_ratio() -> f32 {
    DEFAULT_SEMANTIC_RATIO
}

fn default_limit() -> usize {
    10
}

fn default_dimension() -> usize {
    384
}

fn default_batch_size() -> usize {
    50
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            distance: DistanceStrategy::default(),
            semantic_ratio: default_semantic_ratio(),
            default_limit: default_limit(),
            cache_path: None,
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl StoreConfig {
    /// Calculator for the configured strategy.
    pub fn calculator(&self) -> DistanceCalculator {
        DistanceCalculator::new(self.distance)
    }

    /// Resolved cache path, if one is configured.
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache_path.as_deref().map(PathBuf::from)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.semantic_ratio) {
            return Err(Error::config(format!(
                "semantic_ratio must be within [0, 1], got {}",
                self.semantic_ratio
            )));
        }
        if self.dimension == 0 {
            return Err(Error::config("dimension must be greater than zero"));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be greater than zero"));
        }
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.distance, DistanceStrategy::Cosine);
        assert_eq!(config.semantic_ratio, 0.5);
        assert_eq!(config.default_limit, 10);
        assert!(config.cache_path.is_none());
        assert_eq!(config.dimension, 384);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_partial_toml() {
        let config: StoreConfig = toml::from_str(
            r#"
            distance = "euclidean"
            cache_path = "/tmp/quarry.json"
            batch_size = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.distance, DistanceStrategy::Euclidean);
        assert_eq!(config.cache_path(), Some(PathBuf::from("/tmp/quarry.json")));
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.calculator().strategy(), DistanceStrategy::Euclidean);
    }

    #[test]
    fn test_store_config_empty_json() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_validate_semantic_ratio() {
        let config = StoreConfig {
            semantic_ratio: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("semantic_ratio"));
    }

    #[test]
    fn test_validate_chunking() {
        let config = StoreConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StoreConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_sizes() {
        for config in [
            StoreConfig {
                dimension: 0,
                ..Default::default()
            },
            StoreConfig {
                batch_size: 0,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err());
        }
    }
}
