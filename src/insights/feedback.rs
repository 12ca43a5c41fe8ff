//! Feedback recorder
//!
//! Accepts accuracy votes on a type of prediction. Records are append-only
//! and are only read back for reporting.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::storage::{FeedbackRecord, FeedbackStore, FeedbackTally, InsightType, StorageError};

/// Recorded when a submission names no author
pub const ANONYMOUS: &str = "anonymous";

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A parsed and validated feedback request body
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSubmission {
    pub subject_id: String,
    pub insight_type: InsightType,
    pub accurate: bool,
    pub submitted_by: Option<String>,
}

impl FeedbackSubmission {
    /// Validate a raw JSON body.
    ///
    /// `accurate` must be a JSON boolean; strings and numbers are rejected
    /// rather than coerced.
    pub fn from_json(body: &Value) -> Result<Self, FeedbackError> {
        let body = body
            .as_object()
            .ok_or_else(|| invalid("request body must be a JSON object"))?;

        let subject_id = match body.get("subject_id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(invalid("subject_id is required"))
            }
            Some(_) => return Err(invalid("subject_id must be a string")),
        };

        let insight_type = match body.get("insight_type") {
            Some(Value::String(s)) => s.parse::<InsightType>().map_err(FeedbackError::Validation)?,
            None | Some(Value::Null) => return Err(invalid("insight_type is required")),
            Some(_) => return Err(invalid("insight_type must be a string")),
        };

        let accurate = match body.get("accurate") {
            Some(Value::Bool(b)) => *b,
            None | Some(Value::Null) => return Err(invalid("accurate is required")),
            Some(_) => return Err(invalid("accurate must be true or false")),
        };

        let submitted_by = match body.get("submitted_by") {
            Some(Value::String(s)) => Some(s.clone()),
            None | Some(Value::Null) => None,
            Some(_) => return Err(invalid("submitted_by must be a string")),
        };

        Ok(Self {
            subject_id,
            insight_type,
            accurate,
            submitted_by,
        })
    }
}

fn invalid(message: &str) -> FeedbackError {
    FeedbackError::Validation(message.to_string())
}

pub struct FeedbackRecorder {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackRecorder {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Append one vote and return the new record id
    pub async fn record(
        &self,
        subject_id: &str,
        insight_type: InsightType,
        accurate: bool,
        submitted_by: Option<&str>,
    ) -> Result<String, FeedbackError> {
        let submitted_by = submitted_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(ANONYMOUS);

        let record = FeedbackRecord {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            insight_type,
            accurate,
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now(),
        };

        let id = self.store.append(record).await?;

        tracing::info!(
            subject_id = %subject_id,
            insight_type = %insight_type,
            accurate,
            feedback_id = %id,
            "Recorded insight feedback"
        );

        Ok(id)
    }

    pub async fn submit(&self, submission: &FeedbackSubmission) -> Result<String, FeedbackError> {
        self.record(
            &submission.subject_id,
            submission.insight_type,
            submission.accurate,
            submission.submitted_by.as_deref(),
        )
        .await
    }

    /// Vote counts per insight type, all three types always present
    pub async fn summary(&self, subject_id: &str) -> Result<Vec<FeedbackTally>, FeedbackError> {
        Ok(self.store.summary(subject_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use serde_json::json;

    fn recorder() -> (FeedbackRecorder, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        (FeedbackRecorder::new(store.clone()), store)
    }

    #[test]
    fn test_parse_valid_submission() {
        let submission = FeedbackSubmission::from_json(&json!({
            "subject_id": "baby_001",
            "insight_type": "sleep",
            "accurate": false,
            "submitted_by": "parent_1"
        }))
        .unwrap();

        assert_eq!(submission.subject_id, "baby_001");
        assert_eq!(submission.insight_type, InsightType::Sleep);
        assert!(!submission.accurate);
        assert_eq!(submission.submitted_by.as_deref(), Some("parent_1"));
    }

    #[test]
    fn test_accurate_must_be_boolean() {
        for accurate in [json!("yes"), json!("true"), json!(1), json!(null)] {
            let result = FeedbackSubmission::from_json(&json!({
                "subject_id": "baby_001",
                "insight_type": "feeding",
                "accurate": accurate
            }));
            assert!(
                matches!(result, Err(FeedbackError::Validation(_))),
                "accepted {}",
                accurate
            );
        }

        let missing = FeedbackSubmission::from_json(&json!({
            "subject_id": "baby_001",
            "insight_type": "feeding"
        }));
        assert!(matches!(missing, Err(FeedbackError::Validation(_))));
    }

    #[test]
    fn test_rejects_unknown_insight_type_and_blank_subject() {
        let bad_type = FeedbackSubmission::from_json(&json!({
            "subject_id": "baby_001",
            "insight_type": "diaper",
            "accurate": true
        }));
        assert!(matches!(bad_type, Err(FeedbackError::Validation(m)) if m.contains("diaper")));

        let upper = FeedbackSubmission::from_json(&json!({
            "subject_id": "baby_001",
            "insight_type": "Feeding",
            "accurate": true
        }));
        assert!(upper.is_err());

        let blank = FeedbackSubmission::from_json(&json!({
            "subject_id": "  ",
            "insight_type": "growth",
            "accurate": true
        }));
        assert!(blank.is_err());

        assert!(FeedbackSubmission::from_json(&json!(["not", "an", "object"])).is_err());
    }

    /// Keeps appended records in memory so tests can inspect them
    #[derive(Default)]
    struct CapturingStore {
        records: std::sync::Mutex<Vec<FeedbackRecord>>,
    }

    #[async_trait::async_trait]
    impl FeedbackStore for CapturingStore {
        async fn append(&self, record: FeedbackRecord) -> crate::storage::StorageResult<String> {
            let id = record.id.clone();
            self.records.lock().unwrap().push(record);
            Ok(id)
        }

        async fn summary(&self, _subject_id: &str) -> crate::storage::StorageResult<Vec<FeedbackTally>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_record_defaults_to_anonymous() {
        let store = Arc::new(CapturingStore::default());
        let recorder = FeedbackRecorder::new(store.clone());

        let id = recorder
            .record("baby_001", InsightType::Feeding, true, None)
            .await
            .unwrap();
        let blank_id = recorder
            .record("baby_001", InsightType::Growth, false, Some(" "))
            .await
            .unwrap();
        recorder
            .record("baby_001", InsightType::Sleep, true, Some("parent_1"))
            .await
            .unwrap();
        assert_ne!(id, blank_id);

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].submitted_by, "anonymous");
        assert_eq!(records[1].submitted_by, "anonymous");
        assert!(!records[1].accurate);
        assert_eq!(records[2].submitted_by, "parent_1");
    }

    #[tokio::test]
    async fn test_summary_counts_votes() {
        let (recorder, _store) = recorder();

        for accurate in [true, true, false] {
            recorder
                .record("baby_001", InsightType::Sleep, accurate, Some("parent"))
                .await
                .unwrap();
        }
        recorder
            .record("baby_002", InsightType::Sleep, false, None)
            .await
            .unwrap();

        let summary = recorder.summary("baby_001").await.unwrap();
        assert_eq!(summary.len(), 3);

        let sleep = summary
            .iter()
            .find(|t| t.insight_type == InsightType::Sleep)
            .unwrap();
        assert_eq!((sleep.accurate, sleep.inaccurate), (2, 1));

        let growth = summary
            .iter()
            .find(|t| t.insight_type == InsightType::Growth)
            .unwrap();
        assert_eq!((growth.accurate, growth.inaccurate), (0, 0));
    }
}
