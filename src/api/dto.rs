//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Event, EventPayload, FeedbackTally, Subject};

// ============================================
// SUBJECT DTOs
// ============================================

/// Register a baby profile
#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// IANA timezone name, defaults to UTC
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_days: Option<i64>,
}

impl From<Subject> for SubjectResponse {
    fn from(subject: Subject) -> Self {
        let age_days = subject.age_in_days(Utc::now());
        Self { subject, age_days }
    }
}

#[derive(Debug, Serialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<SubjectResponse>,
    pub count: usize,
}

// ============================================
// EVENT DTOs
// ============================================

/// Log a feeding, sleep or growth event
///
/// `kind` selects the payload shape; the remaining fields are flattened
/// next to it.
#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    /// Defaults to the time of the request
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Query parameters for listing events
#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub subject_id: String,
    pub events: Vec<Event>,
    pub count: usize,
}

// ============================================
// FEEDBACK DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub status: String,
    pub message: String,
    pub feedback_id: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackSummaryResponse {
    pub subject_id: String,
    pub tallies: Vec<FeedbackTally>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Store status: "ok" or "error"
    pub storage: String,
    pub uptime_seconds: u64,
    pub version: String,
}
