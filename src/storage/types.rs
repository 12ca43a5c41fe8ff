//! Core data types for the SmartCare store
//!
//! This module defines the records the service persists:
//! - `Subject`: The baby profile that events and insights belong to
//! - `Event`: One logged feeding, sleep or growth occurrence
//! - `FeedbackRecord`: A thumbs-up/down judgment on one insight type
//! - `CacheEntry`: A serialized insight snapshot with its expiry

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storage::error::StorageError;

/// The three kinds of care events that can be logged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Feeding,
    Sleep,
    Growth,
}

impl EventKind {
    /// Get all kinds for iteration
    pub fn all() -> &'static [EventKind] {
        &[EventKind::Feeding, EventKind::Sleep, EventKind::Growth]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Feeding => "feeding",
            EventKind::Sleep => "sleep",
            EventKind::Growth => "growth",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feeding" => Ok(EventKind::Feeding),
            "sleep" => Ok(EventKind::Sleep),
            "growth" => Ok(EventKind::Growth),
            other => Err(format!(
                "unknown kind '{}', expected one of: feeding, sleep, growth",
                other
            )),
        }
    }
}

/// The prediction a piece of feedback refers to
///
/// Feedback is about the type of prediction, not one specific snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Feeding,
    Sleep,
    Growth,
}

impl InsightType {
    pub fn all() -> &'static [InsightType] {
        &[InsightType::Feeding, InsightType::Sleep, InsightType::Growth]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Feeding => "feeding",
            InsightType::Sleep => "sleep",
            InsightType::Growth => "growth",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feeding" => Ok(InsightType::Feeding),
            "sleep" => Ok(InsightType::Sleep),
            "growth" => Ok(InsightType::Growth),
            other => Err(format!(
                "insight_type must be one of feeding, sleep, growth (got '{}')",
                other
            )),
        }
    }
}

/// A baby profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    /// Caller-chosen identifier, e.g. `baby_001`
    pub id: String,
    /// Display name
    pub name: String,
    /// Date of birth, if known
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// IANA timezone name used for local hour-of-day calculations
    pub timezone: String,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

impl Subject {
    /// Create a subject in UTC
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date_of_birth: None,
            timezone: "UTC".to_string(),
            created_at: Utc::now(),
        }
    }

    /// Builder method: set date of birth
    pub fn born(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }

    /// Builder method: set timezone
    pub fn timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = tz.into();
        self
    }

    /// Parsed timezone, UTC when the stored name is not recognized
    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or(Tz::UTC)
    }

    /// Age in whole days at the given instant
    pub fn age_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        let today = now.with_timezone(&self.tz()).date_naive();
        self.date_of_birth
            .map(|dob| today.signed_duration_since(dob).num_days())
    }

    /// Check the identifier and timezone before the subject is stored
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.id.is_empty() || self.id.len() > 64 {
            return Err(StorageError::InvalidSubject(
                "id must be between 1 and 64 characters".to_string(),
            ));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::InvalidSubject(format!(
                "id '{}' may only contain letters, digits, '_' and '-'",
                self.id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(StorageError::InvalidSubject(
                "name cannot be empty".to_string(),
            ));
        }
        if self.timezone.parse::<Tz>().is_err() {
            return Err(StorageError::InvalidSubject(format!(
                "unknown timezone '{}'",
                self.timezone
            )));
        }
        Ok(())
    }
}

/// How a feeding was given
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedingMethod {
    Breast,
    Bottle,
    Solid,
}

/// Whether a sleep was a daytime nap or night sleep
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SleepType {
    Nap,
    Night,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<FeedingMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SleepDetails {
    /// End of the sleep; the start is the event's `occurred_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_type: Option<SleepType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GrowthDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Kind-specific event fields, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventPayload {
    Feeding(FeedingDetails),
    Sleep(SleepDetails),
    Growth(GrowthDetails),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Feeding(_) => EventKind::Feeding,
            EventPayload::Sleep(_) => EventKind::Sleep,
            EventPayload::Growth(_) => EventKind::Growth,
        }
    }

    /// Reject payloads that would feed nonsense into the analyzers
    pub fn validate(&self, occurred_at: DateTime<Utc>) -> Result<(), StorageError> {
        match self {
            EventPayload::Feeding(f) => {
                non_negative("amount_ml", f.amount_ml)?;
                non_negative("duration_minutes", f.duration_minutes)?;
            }
            EventPayload::Sleep(s) => {
                if let Some(end) = s.ended_at {
                    if end < occurred_at {
                        return Err(StorageError::InvalidEvent(
                            "sleep cannot end before it starts".to_string(),
                        ));
                    }
                }
            }
            EventPayload::Growth(g) => {
                if g.weight_kg.is_none() && g.height_cm.is_none() && g.head_circumference_cm.is_none()
                {
                    return Err(StorageError::InvalidEvent(
                        "growth event needs at least one measurement".to_string(),
                    ));
                }
                positive("weight_kg", g.weight_kg)?;
                positive("height_cm", g.height_cm)?;
                positive("head_circumference_cm", g.head_circumference_cm)?;
            }
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: Option<f64>) -> Result<(), StorageError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(StorageError::InvalidEvent(format!(
            "{} must be a non-negative number",
            field
        ))),
        _ => Ok(()),
    }
}

fn positive(field: &str, value: Option<f64>) -> Result<(), StorageError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(StorageError::InvalidEvent(format!(
            "{} must be a positive number",
            field
        ))),
        _ => Ok(()),
    }
}

/// One logged care event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub subject_id: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Create an event with a fresh id
    pub fn new(subject_id: impl Into<String>, occurred_at: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            occurred_at,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// An append-only accuracy judgment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub id: String,
    pub subject_id: String,
    pub insight_type: InsightType,
    pub accurate: bool,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}

/// Vote counts for one insight type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackTally {
    pub insight_type: InsightType,
    pub accurate: u64,
    pub inaccurate: u64,
}

/// A cached insight snapshot, stored as JSON
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub subject_id: String,
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_payload_json_shape() {
        let event = Event::new(
            "baby_001",
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            EventPayload::Growth(GrowthDetails {
                weight_kg: Some(4.2),
                ..Default::default()
            }),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "growth");
        assert_eq!(json["weight_kg"], 4.2);
        assert!(json.get("height_cm").is_none());

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_sleep_payload_parses_nap_tag() {
        let payload: EventPayload =
            serde_json::from_str(r#"{"kind": "sleep", "sleep_type": "nap"}"#).unwrap();
        match payload {
            EventPayload::Sleep(s) => assert_eq!(s.sleep_type, Some(SleepType::Nap)),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_growth_validation() {
        let now = Utc::now();
        let empty = EventPayload::Growth(GrowthDetails::default());
        assert!(matches!(
            empty.validate(now),
            Err(StorageError::InvalidEvent(_))
        ));

        let negative = EventPayload::Growth(GrowthDetails {
            weight_kg: Some(-1.0),
            ..Default::default()
        });
        assert!(negative.validate(now).is_err());

        let ok = EventPayload::Growth(GrowthDetails {
            height_cm: Some(52.0),
            ..Default::default()
        });
        assert!(ok.validate(now).is_ok());
    }

    #[test]
    fn test_sleep_end_before_start_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap();
        let payload = EventPayload::Sleep(SleepDetails {
            ended_at: Some(start - chrono::Duration::minutes(5)),
            ..Default::default()
        });
        assert!(payload.validate(start).is_err());
    }

    #[test]
    fn test_subject_validation_and_age() {
        let subject = Subject::new("baby_001", "Emma")
            .born(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
            .timezone("Asia/Kolkata");
        assert!(subject.validate().is_ok());
        assert_eq!(subject.tz(), chrono_tz::Asia::Kolkata);

        let now = Utc.with_ymd_and_hms(2024, 1, 25, 12, 0, 0).unwrap();
        assert_eq!(subject.age_in_days(now), Some(10));

        assert!(Subject::new("bad id", "Emma").validate().is_err());
        assert!(Subject::new("baby", "Emma").timezone("Mars/Base").validate().is_err());
    }

    #[test]
    fn test_insight_type_parsing_is_strict() {
        assert_eq!("sleep".parse::<InsightType>(), Ok(InsightType::Sleep));
        assert!("Sleep".parse::<InsightType>().is_err());
        assert!("diaper".parse::<InsightType>().is_err());
    }
}
