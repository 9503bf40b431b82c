use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationCandidate,
};

use super::AppState;

/// Default count matching the frontend's full recommendations view.
const DEFAULT_LIMIT: usize = 15;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Handler for the recommendations endpoint
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationsQuery>,
) -> AppResult<Json<Vec<RecommendationCandidate>>> {
    if params.limit == 0 || params.limit > MAX_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }

    tracing::info!(
        request_id = %request_id,
        limit = params.limit,
        "Processing recommendations request"
    );

    let recommendations = state.recommendations.get_recommendations(params.limit).await?;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendations ready"
    );

    Ok(Json(recommendations))
}

/// Favorites-changed hook: the frontend calls this after adding or removing
/// a favorite so the next request recomputes.
pub async fn invalidate_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> StatusCode {
    tracing::info!(request_id = %request_id, "Invalidating recommendation cache");
    state.recommendations.invalidate().await;
    StatusCode::NO_CONTENT
}
