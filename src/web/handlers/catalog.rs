// Catalog snapshot handlers.
//
// GET  /api/catalog         metadata of the published snapshot
// POST /api/catalog/reload  rebuild from the store and publish
//
// A reload builds the whole snapshot (catalog + similarity matrix) before it
// replaces the current one. If the stored catalog can't be indexed the old
// snapshot keeps serving and the error is returned.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::db;
use crate::engine::EngineSnapshot;
use crate::error::RecommendError;
use crate::web::{recommendation_error, storage_error, AppState};

/// GET /api/catalog: describe the snapshot currently serving requests.
pub async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.engine.snapshot();
    Json(snapshot_json(&snapshot))
}

/// POST /api/catalog/reload: rebuild the snapshot from the catalog store.
pub async fn reload_catalog(State(state): State<AppState>) -> Response {
    let catalog = match db::load_catalog(state.db.as_ref()).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "Catalog reload failed");
            return match e.downcast_ref::<RecommendError>() {
                Some(core) => recommendation_error(core),
                None => storage_error(),
            };
        }
    };

    match state.engine.publish(catalog) {
        Ok(snapshot) => Json(snapshot_json(&snapshot)).into_response(),
        Err(e) => {
            error!(error = %e, "Catalog snapshot build failed");
            recommendation_error(&e)
        }
    }
}

fn snapshot_json(snapshot: &EngineSnapshot) -> serde_json::Value {
    serde_json::json!({
        "version": snapshot.version,
        "built_at": snapshot.built_at,
        "size": snapshot.catalog().len(),
        "dimension": snapshot.catalog().dimension(),
    })
}
