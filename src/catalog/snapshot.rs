// Catalog snapshot: the immutable, indexed set of entities one similarity
// matrix is built from.
//
// Index position is the dense-array index used by the matrix and the ranking
// functions, so the id <-> index mapping must stay fixed for the lifetime of
// the snapshot. All validation happens here, once, at construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::traits::CatalogLookup;
use crate::error::{RecommendError, Result};

/// A catalog entry as the engine sees it: identity, display name, features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub features: Vec<f64>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, features: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            features,
        }
    }
}

/// An ordered, validated catalog.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    dimension: usize,
}

impl CatalogSnapshot {
    /// Build a snapshot, rejecting catalogs the engine can't rank.
    ///
    /// Fails on duplicate identifiers, zero-length or mismatched feature
    /// vectors, and non-finite feature values. An empty catalog is accepted;
    /// every lookup against it simply misses.
    pub fn new(entities: Vec<Entity>) -> Result<Self> {
        let dimension = entities.first().map(|e| e.features.len()).unwrap_or(0);
        let mut index = HashMap::with_capacity(entities.len());

        for (i, entity) in entities.iter().enumerate() {
            if entity.features.is_empty() {
                return Err(RecommendError::Configuration(format!(
                    "entity {} has an empty feature vector",
                    entity.id
                )));
            }
            if entity.features.len() != dimension {
                return Err(RecommendError::Configuration(format!(
                    "entity {} has {} features, expected {}",
                    entity.id,
                    entity.features.len(),
                    dimension
                )));
            }
            if entity.features.iter().any(|v| !v.is_finite()) {
                return Err(RecommendError::Configuration(format!(
                    "entity {} has a non-finite feature value",
                    entity.id
                )));
            }
            if index.insert(entity.id.clone(), i).is_some() {
                return Err(RecommendError::Configuration(format!(
                    "duplicate entity id {}",
                    entity.id
                )));
            }
        }

        Ok(Self {
            entities,
            index,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Shared feature dimension (0 for an empty catalog).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Canonical index of an identifier.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn entity(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Feature vectors in index order, ready for ranking.
    pub fn vectors(&self) -> Vec<&[f64]> {
        self.entities.iter().map(|e| e.features.as_slice()).collect()
    }
}

impl CatalogLookup for CatalogSnapshot {
    fn get(&self, id: &str) -> Option<&Entity> {
        self.index_of(id).and_then(|i| self.entities.get(i))
    }

    fn all(&self) -> &[Entity] {
        &self.entities
    }
}
