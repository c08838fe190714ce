// Recommendation handlers.
//
// GET /api/recommendations/products/{product_id}?maxResults=N
// GET /api/recommendations/users/{user_id}?maxResults=N
// GET /api/recommendations/users?userId=U&maxResults=N
//
// All return a JSON array of { id, name, score, price, category, images }.
// The engine only knows ids, names and scores; price, category and images
// come from joining against the catalog store here.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::db::models::RecommendedProduct;
use crate::engine::Recommendation;
use crate::web::{api_error, recommendation_error, storage_error, AppState};

#[derive(Deserialize, Default)]
pub struct RecommendationQuery {
    /// Requested result count (default 4, clamped to the ceiling)
    #[serde(rename = "maxResults")]
    pub max_results: Option<usize>,
    /// User for the id-less user route
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Unparseable query strings get the same JSON error shape as engine failures.
fn parse_query(
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<RecommendationQuery, Response> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(error = %message, "Rejected recommendation query");
            Err(api_error(StatusCode::BAD_REQUEST, "invalid_input", &message))
        }
    }
}

/// GET /api/recommendations/products/{product_id}
pub async fn product_recommendations(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Response {
    let params = match parse_query(query) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let result = state.engine.similar_to(&product_id, params.max_results, &[]);
    let recommendations = match result {
        Ok(recs) => recs,
        Err(e) => {
            warn!(product_id = %product_id, reason = e.reason_code(), "No product recommendations");
            return recommendation_error(&e);
        }
    };

    info!(
        product_id = %product_id,
        results = recommendations.len(),
        "Returning product recommendations"
    );
    render(&state, &recommendations).await
}

/// GET /api/recommendations/users/{user_id}
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Response {
    match parse_query(query) {
        Ok(params) => recommend_for_user(&state, &user_id, params.max_results).await,
        Err(response) => response,
    }
}

/// GET /api/recommendations/users?userId=U
///
/// The storefront calls this path without an id in it. The user must then
/// come from the `userId` query parameter.
pub async fn user_recommendations_by_query(
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Response {
    let params = match parse_query(query) {
        Ok(params) => params,
        Err(response) => return response,
    };
    match params.user_id.as_deref().map(str::trim) {
        Some(user_id) if !user_id.is_empty() => {
            recommend_for_user(&state, user_id, params.max_results).await
        }
        _ => api_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "missing user id: use /api/recommendations/users/{user_id} or ?userId=",
        ),
    }
}

async fn recommend_for_user(
    state: &AppState,
    user_id: &str,
    max_results: Option<usize>,
) -> Response {
    let history = match state.db.get_purchase_history(user_id).await {
        Ok(history) => history,
        Err(e) => {
            error!(error = %e, user_id = %user_id, "DB error fetching purchase history");
            return storage_error();
        }
    };

    let result = state
        .engine
        .recommend_for_user(&history, user_id, max_results);
    let recommendations = match result {
        Ok(recs) => recs,
        Err(e) => {
            warn!(user_id = %user_id, reason = e.reason_code(), "No user recommendations");
            return recommendation_error(&e);
        }
    };

    info!(
        user_id = %user_id,
        results = recommendations.len(),
        "Returning user recommendations"
    );
    render(state, &recommendations).await
}

/// Join with catalog display fields and serialize.
async fn render(state: &AppState, recommendations: &[Recommendation]) -> Response {
    let ids: Vec<String> = recommendations.iter().map(|r| r.id.clone()).collect();
    match state.db.get_products_by_ids(&ids).await {
        Ok(products) => Json(RecommendedProduct::join(recommendations, &products)).into_response(),
        Err(e) => {
            error!(error = %e, "DB error joining recommendation details");
            storage_error()
        }
    }
}
