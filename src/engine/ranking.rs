// Ranking: turn a vector of scores into a capped, ordered result list.
//
// Both entry points share `rank_scores`: drop excluded indices, sort by score
// descending with ascending catalog index as the tie-break, truncate to the
// cap. The cap is always clamped to MAX_RESULTS_CEILING no matter what the
// caller asks for.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::similarity::{cosine_with_profile, SimilarityMatrix};
use crate::error::{RecommendError, Result};

/// Hard ceiling on result length.
pub const MAX_RESULTS_CEILING: usize = 10;

/// Result length when the caller doesn't specify one.
pub const DEFAULT_MAX_RESULTS: usize = 4;

/// One ranked catalog index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub score: f64,
}

/// Higher score first; equal scores fall back to lower index first.
fn by_score_then_index(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Rank `scores` (indexed by catalog position), skipping `exclude`.
pub fn rank_scores(scores: &[f64], cap: usize, exclude: &HashSet<usize>) -> Vec<Ranked> {
    let cap = cap.min(MAX_RESULTS_CEILING);
    if cap == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked> = scores
        .iter()
        .enumerate()
        .filter(|(i, _)| !exclude.contains(i))
        .map(|(index, &score)| Ranked { index, score })
        .collect();

    ranked.sort_by(by_score_then_index);
    ranked.truncate(cap);
    ranked
}

/// Entities most similar to `source_index`, read from the precomputed row.
///
/// The source itself is never part of the result.
pub fn rank_by_similarity_row(
    matrix: &SimilarityMatrix,
    source_index: usize,
    cap: usize,
    exclude: &HashSet<usize>,
) -> Result<Vec<Ranked>> {
    let row = matrix.row(source_index).ok_or_else(|| {
        RecommendError::NotFound(format!("catalog index {source_index} out of range"))
    })?;

    let mut exclude = exclude.clone();
    exclude.insert(source_index);

    Ok(rank_scores(row, cap, &exclude))
}

/// Entities most similar to a synthesized profile vector.
///
/// There is no "self" to drop here; only `exclude` is removed (usually
/// everything the user already bought).
pub fn rank_by_profile(
    catalog_vectors: &[&[f64]],
    profile: &[f64],
    cap: usize,
    exclude: &HashSet<usize>,
) -> Result<Vec<Ranked>> {
    if profile.is_empty() {
        return Err(RecommendError::InvalidInput(
            "cannot rank against an empty profile".to_string(),
        ));
    }
    if let Some(expected) = catalog_vectors.first().map(|v| v.len()) {
        if expected != profile.len() {
            return Err(RecommendError::InvalidInput(format!(
                "profile has dimension {}, catalog has {expected}",
                profile.len()
            )));
        }
    }

    let scores = cosine_with_profile(catalog_vectors, profile);
    Ok(rank_scores(&scores, cap, exclude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(vectors: &[Vec<f64>]) -> SimilarityMatrix {
        SimilarityMatrix::from_vectors(vectors.iter().map(|v| v.as_slice())).unwrap()
    }

    #[test]
    fn test_three_entity_scenario() {
        let m = matrix(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = rank_by_similarity_row(&m, 0, 2, &HashSet::new()).unwrap();
        assert_eq!(
            ranked,
            vec![
                Ranked { index: 1, score: 1.0 },
                Ranked { index: 2, score: 0.0 },
            ]
        );
    }

    #[test]
    fn test_source_never_included() {
        let m = matrix(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
        for source in 0..3 {
            let ranked = rank_by_similarity_row(&m, source, 10, &HashSet::new()).unwrap();
            assert_eq!(ranked.len(), 2);
            assert!(ranked.iter().all(|r| r.index != source));
        }
    }

    #[test]
    fn test_ties_break_by_ascending_index() {
        let scores = [0.5, 0.9, 0.5, 0.9, 0.5];
        let ranked = rank_scores(&scores, 5, &HashSet::new());
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_cap_clamped_to_ceiling() {
        let scores: Vec<f64> = (0..25).map(|i| i as f64 / 25.0).collect();
        let ranked = rank_scores(&scores, 1000, &HashSet::new());
        assert_eq!(ranked.len(), MAX_RESULTS_CEILING);
    }

    #[test]
    fn test_cap_zero_is_empty() {
        let ranked = rank_scores(&[0.1, 0.2], 0, &HashSet::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_exclusions_respected() {
        let m = matrix(&[
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.5, 0.5],
            vec![0.0, 1.0],
        ]);
        let exclude: HashSet<usize> = [1].into_iter().collect();
        let ranked = rank_by_similarity_row(&m, 0, 10, &exclude).unwrap();
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[test]
    fn test_unknown_source_is_not_found() {
        let m = matrix(&[vec![1.0]]);
        let err = rank_by_similarity_row(&m, 5, 3, &HashSet::new()).unwrap_err();
        assert!(matches!(err, RecommendError::NotFound(_)));
    }

    #[test]
    fn test_profile_excludes_callers_set_only() {
        let vectors: Vec<Vec<f64>> = vec![vec![1.0, 0.0], vec![0.8, 0.2], vec![0.0, 1.0]];
        let refs: Vec<&[f64]> = vectors.iter().map(|v| v.as_slice()).collect();
        let exclude: HashSet<usize> = [0].into_iter().collect();
        let ranked = rank_by_profile(&refs, &[1.0, 0.0], 10, &exclude).unwrap();
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_profile_without_exclusions_keeps_everything() {
        let vectors: Vec<Vec<f64>> = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let refs: Vec<&[f64]> = vectors.iter().map(|v| v.as_slice()).collect();
        let ranked = rank_by_profile(&refs, &[1.0, 1.0], 10, &HashSet::new()).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_empty_profile_is_invalid_input() {
        let vectors: Vec<Vec<f64>> = vec![vec![1.0, 0.0]];
        let refs: Vec<&[f64]> = vectors.iter().map(|v| v.as_slice()).collect();
        let err = rank_by_profile(&refs, &[], 4, &HashSet::new()).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidInput(_)));
    }

    #[test]
    fn test_profile_dimension_mismatch_is_invalid_input() {
        let vectors: Vec<Vec<f64>> = vec![vec![1.0, 0.0]];
        let refs: Vec<&[f64]> = vectors.iter().map(|v| v.as_slice()).collect();
        let err = rank_by_profile(&refs, &[1.0, 0.0, 0.0], 4, &HashSet::new()).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_profile_scores_zero() {
        let vectors: Vec<Vec<f64>> = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let refs: Vec<&[f64]> = vectors.iter().map(|v| v.as_slice()).collect();
        let ranked = rank_by_profile(&refs, &[0.0, 0.0], 4, &HashSet::new()).unwrap();
        assert!(ranked.iter().all(|r| r.score == 0.0));
        assert_eq!(ranked[0].index, 0);
    }
}
