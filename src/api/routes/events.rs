//! Event Routes
//!
//! - POST /api/v1/subjects/:subject_id/events - Log a feeding, sleep or growth event
//! - GET /api/v1/subjects/:subject_id/events - Recent events, newest first

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{EventListResponse, EventQuery, RecordEventRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::storage::{Event, EventKind};

const DEFAULT_EVENT_LIMIT: usize = 50;
const MAX_EVENT_LIMIT: usize = 500;

/// POST /api/v1/subjects/:subject_id/events
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
    ApiJson(req): ApiJson<RecordEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let occurred_at = req.occurred_at.unwrap_or_else(Utc::now);
    let event = Event::new(subject_id, occurred_at, req.payload);

    state.store.insert_event(&event)?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/v1/subjects/:subject_id/events?kind=&limit=
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
    Query(query): Query<EventQuery>,
) -> ApiResult<Json<EventListResponse>> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<EventKind>)
        .transpose()
        .map_err(ApiError::Validation)?;

    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    if limit == 0 || limit > MAX_EVENT_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_EVENT_LIMIT
        )));
    }

    if state.store.find_subject(&subject_id)?.is_none() {
        return Err(ApiError::NotFound(format!("subject '{}'", subject_id)));
    }

    let events = state.store.recent_events(&subject_id, kind, limit)?;

    Ok(Json(EventListResponse {
        subject_id,
        count: events.len(),
        events,
    }))
}
