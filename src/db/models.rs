// Data models: Rust structs that map to database rows.
//
// These are separate from the queries so the engine and the web layer can
// use them without depending on rusqlite directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Entity;
use crate::engine::Recommendation;

/// A product as stored in the catalog: display attributes plus features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    /// Image URLs (JSON-encoded in the DB)
    #[serde(default)]
    pub images: Vec<String>,
    pub features: Vec<f64>,
}

impl From<&Product> for Entity {
    fn from(product: &Product) -> Self {
        Entity::new(
            product.id.clone(),
            product.name.clone(),
            product.features.clone(),
        )
    }
}

/// Image shown for products that have none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200";

/// A recommendation joined with the product's display attributes.
///
/// This is the row shape the HTTP API returns and the client parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub id: String,
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl RecommendedProduct {
    /// Join ranked recommendations with catalog rows, keeping ranking order.
    ///
    /// A recommendation whose product row is missing (deleted since the
    /// snapshot was built) keeps its id, name and score with empty display
    /// fields.
    pub fn join(recommendations: &[Recommendation], products: &[Product]) -> Vec<Self> {
        let by_id: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        recommendations
            .iter()
            .map(|rec| {
                let product = by_id.get(rec.id.as_str());
                let images = match product {
                    Some(p) if !p.images.is_empty() => p.images.clone(),
                    _ => vec![PLACEHOLDER_IMAGE.to_string()],
                };
                RecommendedProduct {
                    id: rec.id.clone(),
                    name: rec.name.clone(),
                    score: rec.score,
                    price: product.map(|p| p.price).unwrap_or(0.0),
                    category: product.map(|p| p.category.clone()).unwrap_or_default(),
                    images,
                }
            })
            .collect()
    }
}

/// A single purchase: `user_id` bought `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub user_id: String,
    pub product_id: String,
}

/// Row counts for the status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub products: i64,
    pub purchases: i64,
    pub users: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_json_defaults() {
        let json = r#"{"id": "42", "name": "Kettle", "features": [0.1, 0.2]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, "");
        assert_eq!(product.price, 0.0);
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_product_to_entity() {
        let product = Product {
            id: "7".to_string(),
            name: "Toaster".to_string(),
            category: "Home".to_string(),
            price: 29.99,
            images: vec![],
            features: vec![0.1, 0.1, 0.3],
        };
        let entity = Entity::from(&product);
        assert_eq!(entity.id, "7");
        assert_eq!(entity.name, "Toaster");
        assert_eq!(entity.features, vec![0.1, 0.1, 0.3]);
    }

    #[test]
    fn test_join_keeps_rank_order_and_fills_images() {
        let recs = vec![
            Recommendation {
                id: "2".to_string(),
                name: "Blender".to_string(),
                score: 0.9,
            },
            Recommendation {
                id: "1".to_string(),
                name: "Kettle".to_string(),
                score: 0.4,
            },
        ];
        let products = vec![
            Product {
                id: "1".to_string(),
                name: "Kettle".to_string(),
                category: "Home".to_string(),
                price: 19.5,
                images: vec!["https://img.example/kettle.jpg".to_string()],
                features: vec![1.0],
            },
            Product {
                id: "2".to_string(),
                name: "Blender".to_string(),
                category: "Home".to_string(),
                price: 49.99,
                images: vec![],
                features: vec![1.0],
            },
        ];

        let joined = RecommendedProduct::join(&recs, &products);
        assert_eq!(joined[0].id, "2");
        assert_eq!(joined[0].price, 49.99);
        assert_eq!(joined[0].images, vec![PLACEHOLDER_IMAGE.to_string()]);
        assert_eq!(joined[1].id, "1");
        assert_eq!(joined[1].images, vec!["https://img.example/kettle.jpg".to_string()]);
    }

    #[test]
    fn test_join_missing_product_row() {
        let recs = vec![Recommendation {
            id: "gone".to_string(),
            name: "Gone".to_string(),
            score: 0.5,
        }];
        let joined = RecommendedProduct::join(&recs, &[]);
        assert_eq!(joined[0].name, "Gone");
        assert_eq!(joined[0].price, 0.0);
        assert_eq!(joined[0].category, "");
    }
}
