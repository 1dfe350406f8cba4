//! Distance-based ranking of documents against a query vector.
//!
//! Every strategy is expressed as a *score* where **higher is better**, so
//! callers never need to know whether the underlying math is a similarity
//! or a distance:
//!
//! | Strategy     | Score                        | Range        |
//! |--------------|------------------------------|--------------|
//! | `Cosine`     | cosine similarity            | \[-1, 1\]    |
//! | `Angular`    | `1 - angle / π`              | \[0, 1\]     |
//! | `Euclidean`  | `1 / (1 + L2 distance)`      | (0, 1\]      |
//! | `Manhattan`  | `1 / (1 + L1 distance)`      | (0, 1\]      |
//! | `Chebyshev`  | `1 / (1 + L∞ distance)`      | (0, 1\]      |
//! | `DotProduct` | dot product                  | unbounded    |

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::document::VectorDocument;
use crate::vector::Vector;

/// Scoring function used to rank documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceStrategy {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Angular similarity derived from the cosine.
    Angular,
    /// Inverse Euclidean (L2) distance.
    Euclidean,
    /// Inverse Manhattan (L1) distance.
    Manhattan,
    /// Inverse Chebyshev (L∞) distance.
    Chebyshev,
    /// Raw dot product.
    DotProduct,
}

impl DistanceStrategy {
    /// Score `b` against `a`. Both slices must have the same length.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Angular => {
                let cosine = cosine_similarity(a, b).clamp(-1.0, 1.0);
                1.0 - cosine.acos() / std::f32::consts::PI
            }
            Self::Euclidean => {
                let sum: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
                inverse(sum.sqrt())
            }
            Self::Manhattan => inverse(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()),
            Self::Chebyshev => inverse(
                a.iter()
                    .zip(b)
                    .map(|(x, y)| (x - y).abs())
                    .fold(0.0, f32::max),
            ),
            Self::DotProduct => dot(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity; zero when either vector has zero norm.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

fn inverse(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

// ============================================================================
// Calculator
// ============================================================================

/// Ranks documents by their score against a query vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistanceCalculator {
    strategy: DistanceStrategy,
}

impl DistanceCalculator {
    /// Create a calculator using `strategy`.
    pub fn new(strategy: DistanceStrategy) -> Self {
        Self { strategy }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    /// Score and rank `documents` against `query`.
    ///
    /// Documents holding the null vector, or a vector whose length differs
    /// from the query's, are skipped. The result is ordered by score
    /// descending; equal scores keep their input order. With `max_items`
    /// only the best `max_items` documents are kept, and no more than that
    /// many candidates are held at any time.
    ///
    /// Returned documents are copies carrying the score.
    pub fn calculate<'a, I>(
        &self,
        documents: I,
        query: &Vector,
        max_items: Option<usize>,
    ) -> std::vec::IntoIter<VectorDocument>
    where
        I: IntoIterator<Item = &'a VectorDocument>,
    {
        let Some(query) = query.data() else {
            return Vec::new().into_iter();
        };

        let candidates = documents
            .into_iter()
            .filter_map(|document| match document.vector.data() {
                Some(data) if data.len() == query.len() => Some((document, data)),
                _ => None,
            })
            .enumerate()
            .map(|(index, (document, data))| {
                Candidate::new(self.strategy.score(query, data), index, document)
            });

        let ranked = match max_items {
            Some(limit) => top_k(candidates, limit),
            None => {
                let mut all: Vec<Candidate<'a>> = candidates.collect();
                all.sort_by(|a, b| b.cmp(a));
                all
            }
        };

        ranked
            .into_iter()
            .map(|candidate| candidate.document.scored(Some(candidate.score)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Keep the best `limit` candidates using a min-heap of size `limit`.
fn top_k<'a>(candidates: impl Iterator<Item = Candidate<'a>>, limit: usize) -> Vec<Candidate<'a>> {
    if limit == 0 {
        return Vec::new();
    }
    // Never reserve more slots than there can be candidates.
    let capacity = match candidates.size_hint() {
        (_, Some(upper)) => limit.min(upper).saturating_add(1),
        (lower, None) => limit.min(lower).saturating_add(1),
    };
    let mut heap: BinaryHeap<Reverse<Candidate<'a>>> = BinaryHeap::with_capacity(capacity);
    for candidate in candidates {
        heap.push(Reverse(candidate));
        if heap.len() > limit {
            heap.pop();
        }
    }
    let mut best: Vec<Candidate<'a>> = heap.into_iter().map(|Reverse(c)| c).collect();
    best.sort_by(|a, b| b.cmp(a));
    best
}

/// A scored document; `Ord` puts better candidates last.
struct Candidate<'a> {
    score: f32,
    key: OrderedFloat<f32>,
    index: usize,
    document: &'a VectorDocument,
}

impl<'a> Candidate<'a> {
    fn new(score: f32, index: usize, document: &'a VectorDocument) -> Self {
        // NaN scores rank below everything else.
        let key = if score.is_nan() {
            OrderedFloat(f32::NEG_INFINITY)
        } else {
            OrderedFloat(score)
        };
        Self {
            score,
            key,
            index,
            document,
        }
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

// ============================================================================
// Tests
// ============================================================================
