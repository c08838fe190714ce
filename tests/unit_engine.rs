use std::collections::{BTreeSet, HashSet};

use recommender::catalog::{CatalogSnapshot, Entity, InteractionHistory, PurchaseHistory};
use recommender::db::seed::{sample_products, sample_purchases};
use recommender::engine::ranking::MAX_RESULTS_CEILING;
use recommender::engine::similarity::{cosine_similarity, SimilarityMatrix};
use recommender::engine::{RankingMode, RankingRequest, RecommendationEngine, ResultLimits};
use recommender::error::RecommendError;

fn sample_catalog() -> CatalogSnapshot {
    let entities = sample_products().iter().map(Entity::from).collect();
    CatalogSnapshot::new(entities).unwrap()
}

fn sample_history() -> PurchaseHistory {
    sample_purchases()
        .into_iter()
        .map(|p| (p.user_id, p.product_id))
        .collect()
}

fn sample_engine() -> RecommendationEngine {
    RecommendationEngine::new(sample_catalog(), ResultLimits::default()).unwrap()
}

fn ids(recs: &[recommender::engine::Recommendation]) -> Vec<&str> {
    recs.iter().map(|r| r.id.as_str()).collect()
}

// --- Similarity matrix over the sample catalog ---

#[test]
fn sample_matrix_is_symmetric_with_unit_diagonal() {
    let catalog = sample_catalog();
    let matrix = SimilarityMatrix::build(&catalog).unwrap();
    assert_eq!(matrix.len(), 10);

    for i in 0..matrix.len() {
        assert_eq!(matrix.get(i, i), Some(1.0));
        for j in 0..matrix.len() {
            let a = matrix.get(i, j).unwrap();
            let b = matrix.get(j, i).unwrap();
            assert_eq!(a, b, "matrix[{i}][{j}] != matrix[{j}][{i}]");
            assert!((-1.0..=1.0).contains(&a));
        }
    }
}

#[test]
fn sample_matrix_matches_pairwise_cosine() {
    let catalog = sample_catalog();
    let matrix = SimilarityMatrix::build(&catalog).unwrap();
    let vectors = catalog.vectors();

    for i in 0..vectors.len() {
        for j in 0..vectors.len() {
            if i == j {
                continue;
            }
            let expected = cosine_similarity(vectors[i], vectors[j]);
            let actual = matrix.get(i, j).unwrap();
            assert!((expected - actual).abs() < 1e-12);
        }
    }
}

// --- Item-based ---

#[test]
fn smartphone_neighbors_in_score_order() {
    let engine = sample_engine();
    let recs = engine.similar_to("1", None, &[]).unwrap();
    // cos(1,4)=0.9994, cos(1,6)=0.9925, cos(1,2)=0.9845, cos(1,3)=0.9751
    assert_eq!(ids(&recs), vec!["4", "6", "2", "3"]);
    assert!((recs[0].score - 0.99943).abs() < 1e-4);
    assert_eq!(recs[0].name, "Smartwatch");
}

#[test]
fn item_based_never_returns_the_source() {
    let engine = sample_engine();
    for product in sample_products() {
        let recs = engine.similar_to(&product.id, Some(10), &[]).unwrap();
        assert_eq!(recs.len(), 9);
        assert!(recs.iter().all(|r| r.id != product.id));
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn item_based_honors_exclusions() {
    let engine = sample_engine();
    let exclude = vec!["4".to_string(), "nonexistent".to_string()];
    let recs = engine.similar_to("1", Some(3), &exclude).unwrap();
    assert_eq!(ids(&recs), vec!["6", "2", "3"]);
}

#[test]
fn oversized_request_is_clamped_to_ceiling() {
    let engine = sample_engine();
    let recs = engine.similar_to("5", Some(1000), &[]).unwrap();
    assert!(recs.len() <= MAX_RESULTS_CEILING);
    assert_eq!(recs.len(), 9);
}

#[test]
fn unknown_product_is_not_found() {
    let engine = sample_engine();
    let err = engine.similar_to("999", None, &[]).unwrap_err();
    assert!(matches!(err, RecommendError::NotFound(_)));
    assert_eq!(err.reason_code(), "not_found");
}

// --- User-based ---

#[test]
fn user_recommendations_exclude_purchases() {
    let engine = sample_engine();
    let history = sample_history();
    let recs = engine.recommend_for_user(&history, "user1", None).unwrap();

    assert_eq!(recs.len(), 4);
    let bought: HashSet<&str> = ["1", "3", "4"].into_iter().collect();
    assert!(recs.iter().all(|r| !bought.contains(r.id.as_str())));
    assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn home_goods_buyer_gets_balanced_products_first() {
    // user3's profile points along (1,1,1); products 1, 2 and 4 are the
    // most balanced of what they haven't bought.
    let engine = sample_engine();
    let history = sample_history();
    let recs = engine.recommend_for_user(&history, "user3", Some(3)).unwrap();

    let top: HashSet<&str> = ids(&recs).into_iter().collect();
    let expected: HashSet<&str> = ["1", "2", "4"].into_iter().collect();
    assert_eq!(top, expected);
}

#[test]
fn user_without_history_is_not_found() {
    let engine = sample_engine();
    let history = sample_history();
    let err = engine
        .recommend_for_user(&history, "nobody", None)
        .unwrap_err();
    assert!(matches!(err, RecommendError::NotFound(_)));
}

#[test]
fn interactions_with_only_unknown_products_are_invalid() {
    let engine = sample_engine();
    let interacted: BTreeSet<String> = ["ghost".to_string()].into_iter().collect();
    let err = engine
        .recommend_from_interactions(&interacted, None)
        .unwrap_err();
    assert!(matches!(err, RecommendError::InvalidInput(_)));
}

#[test]
fn unknown_purchases_are_skipped_in_profile() {
    let engine = sample_engine();
    let with_ghost: BTreeSet<String> = ["5", "6", "7", "ghost"]
        .into_iter()
        .map(String::from)
        .collect();
    let without: BTreeSet<String> = ["5", "6", "7"].into_iter().map(String::from).collect();

    let a = engine.recommend_from_interactions(&with_ghost, None).unwrap();
    let b = engine.recommend_from_interactions(&without, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn buying_everything_leaves_nothing_to_recommend() {
    let engine = sample_engine();
    let all: BTreeSet<String> = sample_products().into_iter().map(|p| p.id).collect();
    let recs = engine.recommend_from_interactions(&all, Some(10)).unwrap();
    assert!(recs.is_empty());
}

// --- Request dispatch ---

#[test]
fn ranking_request_dispatches_by_mode() {
    let engine = sample_engine();
    let history = sample_history();

    let item = RankingRequest {
        mode: RankingMode::ItemBased,
        source_id: "1".to_string(),
        max_results: Some(2),
    };
    assert_eq!(ids(&engine.handle(&item, &history).unwrap()), vec!["4", "6"]);

    let user = RankingRequest {
        mode: RankingMode::UserBased,
        source_id: "user4".to_string(),
        max_results: None,
    };
    let recs = engine.handle(&user, &history).unwrap();
    let bought = history.interacted_entities("user4");
    assert!(recs.iter().all(|r| !bought.contains(&r.id)));
}

#[test]
fn ranking_request_json_shape() {
    let request: RankingRequest = serde_json::from_str(
        r#"{"mode":"user_based","source_id":"user2","max_results":3}"#,
    )
    .unwrap();
    assert_eq!(request.mode, RankingMode::UserBased);
    assert_eq!(request.max_results, Some(3));
}

// --- Snapshot publishing ---

#[test]
fn republish_bumps_version_and_serves_new_catalog() {
    let engine = sample_engine();
    assert_eq!(engine.snapshot().version, 1);

    let mut products = sample_products();
    products.truncate(3);
    let smaller = CatalogSnapshot::new(products.iter().map(Entity::from).collect()).unwrap();
    let published = engine.publish(smaller).unwrap();

    assert_eq!(published.version, 2);
    assert_eq!(engine.snapshot().catalog().len(), 3);
    assert!(engine.similar_to("10", None, &[]).is_err());
    assert_eq!(engine.similar_to("1", Some(10), &[]).unwrap().len(), 2);
}

#[test]
fn configured_limits_lower_the_cap() {
    let limits = ResultLimits::new(2, 5).unwrap();
    let engine = RecommendationEngine::new(sample_catalog(), limits).unwrap();
    assert_eq!(engine.similar_to("1", None, &[]).unwrap().len(), 2);
    assert_eq!(engine.similar_to("1", Some(9), &[]).unwrap().len(), 5);
}

#[test]
fn limits_above_ceiling_are_rejected() {
    let err = ResultLimits::new(4, 11).unwrap_err();
    assert_eq!(err.reason_code(), "configuration_error");
}
