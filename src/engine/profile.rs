// Profile synthesis: turns a user's purchases into one query vector.
//
// The profile is the element-wise mean of the purchased products' feature
// vectors: a centroid of what the user buys. Identifiers the catalog no
// longer knows about (stale history) are skipped, but a profile built from
// nothing is an error rather than a zero vector.

use tracing::debug;

use crate::catalog::CatalogLookup;
use crate::error::{RecommendError, Result};

/// A synthesized profile plus how the input identifiers resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileVector {
    pub values: Vec<f64>,
    /// Identifiers found in the catalog and averaged.
    pub resolved: usize,
    /// Identifiers the catalog didn't know.
    pub skipped: usize,
}

/// Average the feature vectors of every resolvable identifier.
pub fn synthesize<'a, I, C>(interacted_ids: I, catalog: &C) -> Result<ProfileVector>
where
    I: IntoIterator<Item = &'a str>,
    C: CatalogLookup + ?Sized,
{
    let mut sum: Vec<f64> = Vec::new();
    let mut resolved = 0usize;
    let mut skipped = 0usize;

    for id in interacted_ids {
        let Some(entity) = catalog.get(id) else {
            skipped += 1;
            continue;
        };
        if sum.is_empty() {
            sum = vec![0.0; entity.features.len()];
        }
        for (acc, &val) in sum.iter_mut().zip(entity.features.iter()) {
            *acc += val;
        }
        resolved += 1;
    }

    if resolved == 0 {
        return Err(RecommendError::InvalidInput(format!(
            "no interacted products found in the catalog ({skipped} unknown)"
        )));
    }

    if skipped > 0 {
        debug!(resolved, skipped, "Skipped unknown products while building profile");
    }

    let n = resolved as f64;
    for val in &mut sum {
        *val /= n;
    }

    Ok(ProfileVector {
        values: sum,
        resolved,
        skipped,
    })
}
