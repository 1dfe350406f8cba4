//! Embedding vectors.
//!
//! A [`Vector`] is either a dense, fixed-length `f32` array or the
//! [`Vector::Null`] sentinel, which stands for "no embedding available"
//! (for example when a backend did not return one). The null vector is not
//! an empty array: it never takes part in distance computation.

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// An immutable embedding vector or the null-vector sentinel.
///
/// Serializes as a JSON array of numbers, or `null` for the null vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<f32>>", into = "Option<Vec<f32>>")]
pub enum Vector {
    /// A real embedding with at least one component.
    Dense(Vec<f32>),

    /// No embedding available.
    Null,
}

impl Vector {
    /// Create a dense vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `data` is empty.
    pub fn new(data: impl Into<Vec<f32>>) -> Result<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(Error::invalid_argument(
                "a vector must have at least one dimension",
            ));
        }
        Ok(Self::Dense(data))
    }

    /// The null-vector sentinel.
    pub fn null() -> Self {
        Self::Null
    }

    /// Whether this is the null vector.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The vector components, or `None` for the null vector.
    pub fn data(&self) -> Option<&[f32]> {
        match self {
            Self::Dense(data) => Some(data),
            Self::Null => None,
        }
    }

    /// Number of dimensions, or `None` for the null vector.
    pub fn dimensions(&self) -> Option<usize> {
        self.data().map(<[f32]>::len)
    }
}

impl From<Option<Vec<f32>>> for Vector {
    fn from(value: Option<Vec<f32>>) -> Self {
        match value {
            Some(data) if !data.is_empty() => Self::Dense(data),
            _ => Self::Null,
        }
    }
}

impl From<Vector> for Option<Vec<f32>> {
    fn from(value: Vector) -> Self {
        match value {
            Vector::Dense(data) => Some(data),
            Vector::Null => None,
        }
    }
}
