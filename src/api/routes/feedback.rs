//! Feedback Routes
//!
//! - POST /api/v1/feedback - Rate a prediction type as accurate or not
//! - GET /api/v1/subjects/:subject_id/feedback/summary - Vote counts

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{FeedbackResponse, FeedbackSummaryResponse};
use crate::api::error::ApiResult;
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::insights::FeedbackSubmission;

/// POST /api/v1/feedback
///
/// The body is validated by hand so that a non-boolean `accurate` is a
/// validation error rather than a deserialization rejection.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<FeedbackResponse>> {
    let submission = FeedbackSubmission::from_json(&body)?;
    let feedback_id = state.feedback.submit(&submission).await?;

    Ok(Json(FeedbackResponse {
        status: "success".to_string(),
        message: "Feedback recorded successfully".to_string(),
        feedback_id,
    }))
}

/// GET /api/v1/subjects/:subject_id/feedback/summary
pub async fn feedback_summary(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
) -> ApiResult<Json<FeedbackSummaryResponse>> {
    let tallies = state.feedback.summary(&subject_id).await?;
    Ok(Json(FeedbackSummaryResponse {
        subject_id,
        tallies,
    }))
}
