// Cosine similarity and the precomputed pairwise matrix.
//
// The matrix is built once per catalog snapshot and only read afterwards.
// Storage is a flat row-major Vec so a row is a contiguous slice. Only the
// upper triangle is computed; the lower half is mirrored, which keeps
// M[i][j] == M[j][i] exact rather than "equal up to rounding".

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::error::{RecommendError, Result};

/// Euclidean magnitude of a vector.
pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity between two vectors, in [-1, 1].
///
/// A zero-magnitude vector on either side yields exactly 0.0, as do empty or
/// length-mismatched inputs. The result is never NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    cosine_with_norms(a, magnitude(a), b, magnitude(b))
}

fn cosine_with_norms(a: &[f64], norm_a: f64, b: &[f64], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Similarity of one query vector against every catalog vector, in order.
pub fn cosine_with_profile(catalog_vectors: &[&[f64]], profile: &[f64]) -> Vec<f64> {
    let profile_norm = magnitude(profile);
    catalog_vectors
        .iter()
        .map(|v| {
            if v.len() != profile.len() {
                0.0
            } else {
                cosine_with_norms(v, magnitude(v), profile, profile_norm)
            }
        })
        .collect()
}

/// Dense symmetric n x n matrix of pairwise cosine similarity.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build the matrix for every entity in a snapshot.
    pub fn build(snapshot: &CatalogSnapshot) -> Result<Self> {
        Self::from_vectors(snapshot.vectors())
    }

    /// Build the matrix from raw feature vectors (index order preserved).
    ///
    /// All vectors must share one length; a mismatch is a configuration
    /// error, reported here rather than at query time.
    pub fn from_vectors<'a, I>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let vectors: Vec<&[f64]> = vectors.into_iter().collect();
        let n = vectors.len();

        if let Some(first) = vectors.first() {
            let k = first.len();
            if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != k) {
                return Err(RecommendError::Configuration(format!(
                    "feature vector {i} has dimension {}, expected {k}",
                    v.len()
                )));
            }
        }

        let norms: Vec<f64> = vectors.iter().map(|v| magnitude(v)).collect();
        let mut values = vec![0.0_f64; n * n];

        for i in 0..n {
            // Self-similarity is 1 by definition unless the vector is zero.
            values[i * n + i] = if norms[i] == 0.0 { 0.0 } else { 1.0 };
            for j in (i + 1)..n {
                let sim = cosine_with_norms(vectors[i], norms[i], vectors[j], norms[j]);
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        debug!(entities = n, "Built similarity matrix");

        Ok(Self { n, values })
    }

    /// Number of rows (= catalog size).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity between entities `i` and `j`, if both are in range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.n && j < self.n {
            Some(self.values[i * self.n + j])
        } else {
            None
        }
    }

    /// Row `i`: similarity of entity `i` to every entity.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.n {
            Some(&self.values[i * self.n..(i + 1) * self.n])
        } else {
            None
        }
    }
}
