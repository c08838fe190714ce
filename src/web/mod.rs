// Web server: Axum-based JSON API in front of the recommendation engine.
//
// Handlers are thin: they call the engine, join the ranked ids against the
// catalog store for display fields, and render JSON. Any engine failure
// becomes a structured "no recommendations" response with a reason code.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::engine::RecommendationEngine;
use crate::error::RecommendError;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub engine: Arc<RecommendationEngine>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: &Config,
    db: Arc<dyn Database>,
    engine: Arc<RecommendationEngine>,
) -> Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState { db, engine };

    let app = build_router(state);

    info!("Recommendation service listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/recommendations/products/{product_id}",
            get(handlers::recommendations::product_recommendations),
        )
        .route(
            "/api/recommendations/users",
            get(handlers::recommendations::user_recommendations_by_query),
        )
        .route(
            "/api/recommendations/users/{user_id}",
            get(handlers::recommendations::user_recommendations),
        )
        .route("/api/catalog", get(handlers::catalog::get_catalog))
        .route("/api/catalog/reload", post(handlers::catalog::reload_catalog));

    Router::new()
        .merge(api)
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check, always 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Structured error body: message, reason code, and an empty result list.
pub fn api_error(status: StatusCode, reason: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({
            "error": message,
            "reason": reason,
            "recommendations": [],
        })),
    )
        .into_response()
}

/// Map an engine failure onto an HTTP status.
pub fn recommendation_error(err: &RecommendError) -> Response {
    let status = match err {
        RecommendError::NotFound(_) => StatusCode::NOT_FOUND,
        RecommendError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RecommendError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.reason_code(), &err.to_string())
}

/// Storage failures are logged by the caller; clients only see a generic reason.
pub fn storage_error() -> Response {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error",
        "Database error",
    )
}
