//! Subject Routes
//!
//! - GET /api/v1/subjects - List registered babies
//! - POST /api/v1/subjects - Register a baby
//! - GET /api/v1/subjects/:subject_id - Get one profile

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateSubjectRequest, SubjectListResponse, SubjectResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::storage::{Subject, SubjectStore};

/// GET /api/v1/subjects
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SubjectListResponse>> {
    let subjects: Vec<SubjectResponse> = state
        .store
        .list_subjects()
        .await?
        .into_iter()
        .map(SubjectResponse::from)
        .collect();

    Ok(Json(SubjectListResponse {
        count: subjects.len(),
        subjects,
    }))
}

/// POST /api/v1/subjects
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<SubjectResponse>)> {
    let mut subject = Subject::new(req.id.trim(), req.name.trim());
    if let Some(dob) = req.date_of_birth {
        subject = subject.born(dob);
    }
    if let Some(tz) = req.timezone {
        subject = subject.timezone(tz.trim());
    }

    let subject = state.store.create_subject(subject).await?;
    Ok((StatusCode::CREATED, Json(subject.into())))
}

/// GET /api/v1/subjects/:subject_id
pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<String>,
) -> ApiResult<Json<SubjectResponse>> {
    let subject = state
        .store
        .get_subject(&subject_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("subject '{}'", subject_id)))?;

    Ok(Json(subject.into()))
}
