// Recommendation engine: similarity matrix, ranking and profile synthesis
// behind one facade that owns the published catalog snapshot.
//
// A snapshot (catalog + precomputed matrix) is immutable once built. Readers
// clone the Arc and rank without holding any lock; `publish` builds the
// replacement completely before swapping the pointer, so a request only ever
// sees one whole snapshot.

pub mod profile;
pub mod ranking;
pub mod similarity;

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogSnapshot, InteractionHistory};
use crate::error::{RecommendError, Result};
use ranking::{Ranked, DEFAULT_MAX_RESULTS, MAX_RESULTS_CEILING};
use similarity::SimilarityMatrix;

/// One entry of a recommendation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    pub score: f64,
}

/// How many results a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLimits {
    /// Used when the request doesn't say.
    pub default_results: usize,
    /// Upper bound applied to every request. Never above MAX_RESULTS_CEILING.
    pub max_results: usize,
}

impl Default for ResultLimits {
    fn default() -> Self {
        Self {
            default_results: DEFAULT_MAX_RESULTS,
            max_results: MAX_RESULTS_CEILING,
        }
    }
}

impl ResultLimits {
    /// Validate a limit pair: 1 <= default <= max <= MAX_RESULTS_CEILING.
    pub fn new(default_results: usize, max_results: usize) -> Result<Self> {
        if max_results == 0 || max_results > MAX_RESULTS_CEILING {
            return Err(RecommendError::Configuration(format!(
                "max results must be between 1 and {MAX_RESULTS_CEILING}, got {max_results}"
            )));
        }
        if default_results == 0 || default_results > max_results {
            return Err(RecommendError::Configuration(format!(
                "default results must be between 1 and {max_results}, got {default_results}"
            )));
        }
        Ok(Self {
            default_results,
            max_results,
        })
    }

    /// The effective cap for a request.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_results)
            .min(self.max_results)
    }
}

/// Which query a ranking request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// "Products similar to product X"
    ItemBased,
    /// "Products for user U", from their purchase profile
    UserBased,
}

/// A transport-neutral recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub mode: RankingMode,
    /// Product id (item-based) or user id (user-based).
    pub source_id: String,
    pub max_results: Option<usize>,
}

/// A catalog plus its similarity matrix, published as one unit.
#[derive(Debug)]
pub struct EngineSnapshot {
    pub version: u64,
    pub built_at: DateTime<Utc>,
    catalog: CatalogSnapshot,
    matrix: SimilarityMatrix,
}

impl EngineSnapshot {
    /// Precompute the similarity matrix for a catalog.
    pub fn build(catalog: CatalogSnapshot, version: u64) -> Result<Self> {
        let matrix = SimilarityMatrix::build(&catalog)?;
        Ok(Self {
            version,
            built_at: Utc::now(),
            catalog,
            matrix,
        })
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Item-based: products most similar to `product_id`.
    ///
    /// `cap` is the already-resolved result count. Unknown identifiers in
    /// `exclude_ids` are ignored.
    pub fn similar_to(
        &self,
        product_id: &str,
        cap: usize,
        exclude_ids: &[String],
    ) -> Result<Vec<Recommendation>> {
        let source = self
            .catalog
            .index_of(product_id)
            .ok_or_else(|| RecommendError::NotFound(format!("product {product_id}")))?;

        let exclude = self.indices_of(exclude_ids.iter().map(String::as_str));
        let ranked = ranking::rank_by_similarity_row(&self.matrix, source, cap, &exclude)?;
        Ok(self.to_recommendations(&ranked))
    }

    /// User-based: products closest to the mean of `interacted_ids`,
    /// excluding the interacted products themselves.
    pub fn recommend_from_interactions(
        &self,
        interacted_ids: &BTreeSet<String>,
        cap: usize,
    ) -> Result<Vec<Recommendation>> {
        if interacted_ids.is_empty() {
            return Err(RecommendError::InvalidInput(
                "no interacted products to build a profile from".to_string(),
            ));
        }

        let profile = profile::synthesize(interacted_ids.iter().map(String::as_str), &self.catalog)?;
        let exclude = self.indices_of(interacted_ids.iter().map(String::as_str));
        let ranked =
            ranking::rank_by_profile(&self.catalog.vectors(), &profile.values, cap, &exclude)?;
        Ok(self.to_recommendations(&ranked))
    }

    fn indices_of<'a>(&self, ids: impl Iterator<Item = &'a str>) -> HashSet<usize> {
        ids.filter_map(|id| self.catalog.index_of(id)).collect()
    }

    fn to_recommendations(&self, ranked: &[Ranked]) -> Vec<Recommendation> {
        ranked
            .iter()
            .filter_map(|r| {
                self.catalog.entity(r.index).map(|e| Recommendation {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    score: r.score,
                })
            })
            .collect()
    }
}

/// Shared, concurrently readable recommendation engine.
pub struct RecommendationEngine {
    current: RwLock<Arc<EngineSnapshot>>,
    next_version: AtomicU64,
    limits: ResultLimits,
}

impl RecommendationEngine {
    /// Build the first snapshot (version 1). Fails if the catalog is unusable.
    pub fn new(catalog: CatalogSnapshot, limits: ResultLimits) -> Result<Self> {
        let snapshot = EngineSnapshot::build(catalog, 1)?;
        info!(
            products = snapshot.catalog.len(),
            dimension = snapshot.catalog.dimension(),
            "Recommendation engine ready"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(2),
            limits,
        })
    }

    pub fn limits(&self) -> ResultLimits {
        self.limits
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<EngineSnapshot> {
        // The guarded value is a plain Arc, so a poisoned lock still holds
        // a complete snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Build a snapshot for `catalog` and make it current.
    ///
    /// The matrix is computed before the write lock is taken. If a newer
    /// snapshot was published while this one was building, the newer one
    /// stays current.
    pub fn publish(&self, catalog: CatalogSnapshot) -> Result<Arc<EngineSnapshot>> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let snapshot = Arc::new(EngineSnapshot::build(catalog, version)?);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.version > version {
            warn!(
                built = version,
                current = guard.version,
                "Discarding stale snapshot; a newer one was published first"
            );
            return Ok(Arc::clone(&guard));
        }
        *guard = Arc::clone(&snapshot);
        drop(guard);

        info!(
            version,
            products = snapshot.catalog.len(),
            "Published catalog snapshot"
        );
        Ok(snapshot)
    }

    /// Products similar to `product_id`.
    pub fn similar_to(
        &self,
        product_id: &str,
        max_results: Option<usize>,
        exclude_ids: &[String],
    ) -> Result<Vec<Recommendation>> {
        let cap = self.limits.resolve(max_results);
        let results = self.snapshot().similar_to(product_id, cap, exclude_ids)?;
        debug!(product_id, cap, results = results.len(), "Item-based ranking");
        Ok(results)
    }

    /// Products for a user, from whatever history store the caller supplies.
    ///
    /// A user with no recorded interactions is NotFound.
    pub fn recommend_for_user<H>(
        &self,
        history: &H,
        user_id: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<Recommendation>>
    where
        H: InteractionHistory + ?Sized,
    {
        let interacted = history.interacted_entities(user_id);
        if interacted.is_empty() {
            return Err(RecommendError::NotFound(format!(
                "no purchase history for user {user_id}"
            )));
        }
        let results = self.recommend_from_interactions(&interacted, max_results)?;
        debug!(
            user_id,
            purchases = interacted.len(),
            results = results.len(),
            "User-based ranking"
        );
        Ok(results)
    }

    /// Products closest to the profile of `interacted_ids`.
    pub fn recommend_from_interactions(
        &self,
        interacted_ids: &BTreeSet<String>,
        max_results: Option<usize>,
    ) -> Result<Vec<Recommendation>> {
        let cap = self.limits.resolve(max_results);
        self.snapshot().recommend_from_interactions(interacted_ids, cap)
    }

    /// Serve a transport-neutral request.
    pub fn handle<H>(&self, request: &RankingRequest, history: &H) -> Result<Vec<Recommendation>>
    where
        H: InteractionHistory + ?Sized,
    {
        match request.mode {
            RankingMode::ItemBased => self.similar_to(&request.source_id, request.max_results, &[]),
            RankingMode::UserBased => {
                self.recommend_for_user(history, &request.source_id, request.max_results)
            }
        }
    }
}
