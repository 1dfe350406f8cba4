//! Merging of vector and keyword result sets for hybrid queries.
//!
//! # Precedence
//!
//! Vector results come first, each score multiplied by the semantic ratio.
//! Keyword results follow with their score left unset. When an id appears
//! in both lists only its first occurrence is kept, so a vector-derived
//! score always wins over the unscored keyword match.

use std::collections::HashSet;

use crate::document::VectorDocument;

/// Merge ranked vector results with keyword results.
///
/// # Arguments
///
/// * `vector_results` - Scored results of the vector path, best first
/// * `keyword_results` - Unscored results of the keyword path, in store order
/// * `semantic_ratio` - Weight applied to every vector score
pub fn merge_hybrid(
    vector_results: impl IntoIterator<Item = VectorDocument>,
    keyword_results: impl IntoIterator<Item = VectorDocument>,
    semantic_ratio: f32,
) -> Vec<VectorDocument> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for mut document in vector_results {
        if seen.insert(document.id.clone()) {
            document.score = document.score.map(|score| score * semantic_ratio);
            merged.push(document);
        }
    }

    for mut document in keyword_results {
        if seen.insert(document.id.clone()) {
            document.score = None;
            merged.push(document);
        }
    }

    merged
}

// ============================================================================
// Tests
// ============================================================================
