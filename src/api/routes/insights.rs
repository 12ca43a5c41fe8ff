//! Insight Routes
//!
//! - GET /api/v1/insights/:subject_id - Current Smart Care predictions

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::insights::InsightSnapshot;

/// GET /api/v1/insights/:subject_id
///
/// Served from cache for up to the configured TTL, recomputed after.
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
) -> ApiResult<Json<InsightSnapshot>> {
    let snapshot = state.insights.insights(&subject_id).await?;
    Ok(Json(snapshot))
}
