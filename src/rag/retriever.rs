//! Scores every passage against the question vector and selects the top-k.
//!
//! A deliberate linear scan, no index: documents here are small enough that
//! an ANN structure would be overhead. The `Scorer` trait is the seam where
//! an index-backed implementation could be slotted in later.

use std::cmp::Ordering;

use crate::core::errors::ApiError;

use super::types::{Passage, ScoredPassage};

/// Similarity between a passage vector and the question vector.
/// Higher means more relevant.
pub trait Scorer: Send + Sync {
    fn score(&self, passage_vector: &[f32], question_vector: &[f32]) -> f32;
}

/// Raw dot product. The embedding model is expected to return normalized
/// vectors; even if it does not, the relative ordering for a fixed question
/// vector stays consistent, which is all retrieval needs.
pub struct DotProductScorer;

impl Scorer for DotProductScorer {
    fn score(&self, passage_vector: &[f32], question_vector: &[f32]) -> f32 {
        passage_vector
            .iter()
            .zip(question_vector.iter())
            .map(|(a, b)| a * b)
            .sum()
    }
}

/// Rank `passages` against `question_vector` and keep the `top_k` best.
///
/// Sorting is stable and descending: passages with exactly equal scores keep
/// their segmentation order. Every vector must have the question vector's
/// dimensionality; mismatches fail rather than truncate or pad.
pub fn retrieve(
    passages: Vec<(Passage, Vec<f32>)>,
    question_vector: &[f32],
    top_k: usize,
    scorer: &dyn Scorer,
) -> Result<Vec<ScoredPassage>, ApiError> {
    if top_k == 0 {
        return Err(ApiError::InvalidConfiguration(
            "top_k must be greater than zero".to_string(),
        ));
    }

    for (idx, (_, vector)) in passages.iter().enumerate() {
        if vector.len() != question_vector.len() {
            return Err(ApiError::DimensionMismatch(format!(
                "passage {} has dimension {}, question has {}",
                idx,
                vector.len(),
                question_vector.len()
            )));
        }
    }

    let mut scored: Vec<ScoredPassage> = passages
        .into_iter()
        .map(|(passage, vector)| ScoredPassage {
            score: scorer.score(&vector, question_vector),
            passage,
            rank: 0,
        })
        .collect();

    // sort_by is stable, so equal scores preserve segmentation order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);

    for (idx, item) in scored.iter_mut().enumerate() {
        item.rank = idx + 1;
    }

    Ok(scored)
}
