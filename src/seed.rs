//! Demo data
//!
//! One sample baby with a couple of days of history, used by `smartcare seed`
//! and `smartcare-api --seed` to get a fresh install showing predictions.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::storage::{
    Event, EventPayload, FeedingDetails, FeedingMethod, GrowthDetails, SleepDetails, SleepType,
    SqliteStore, StorageError, StorageResult, Subject,
};

pub const DEMO_SUBJECT_ID: &str = "baby_001";

pub fn demo_subject() -> Subject {
    let subject = Subject::new(DEMO_SUBJECT_ID, "Emma Johnson").timezone("Asia/Kolkata");
    match NaiveDate::from_ymd_opt(2024, 1, 15) {
        Some(dob) => subject.born(dob),
        None => subject,
    }
}

/// Sample history relative to `now`, oldest first
pub fn demo_events(now: DateTime<Utc>) -> Vec<(DateTime<Utc>, EventPayload)> {
    let hours = |h: i64| now - Duration::hours(h);
    let minutes = |m: i64| now - Duration::minutes(m);

    let feeding = |amount: f64, duration: f64, notes: &str| {
        EventPayload::Feeding(FeedingDetails {
            amount_ml: Some(amount),
            duration_minutes: Some(duration),
            method: Some(FeedingMethod::Bottle),
            notes: Some(notes.to_string()),
        })
    };

    let sleep = |ended_at: DateTime<Utc>, sleep_type: SleepType, quality: &str, notes: &str| {
        EventPayload::Sleep(SleepDetails {
            ended_at: Some(ended_at),
            sleep_type: Some(sleep_type),
            quality: Some(quality.to_string()),
            notes: Some(notes.to_string()),
        })
    };

    let growth = |weight: f64, height: f64, head: f64, notes: &str| {
        EventPayload::Growth(GrowthDetails {
            weight_kg: Some(weight),
            height_cm: Some(height),
            head_circumference_cm: Some(head),
            notes: Some(notes.to_string()),
        })
    };

    vec![
        (
            now - Duration::days(14),
            growth(3.9, 51.0, 35.0, "Two weeks ago measurement"),
        ),
        (
            now - Duration::days(7),
            growth(4.1, 51.5, 35.2, "Weekly checkup - good progress"),
        ),
        (hours(36), sleep(hours(34), SleepType::Nap, "good", "Afternoon nap")),
        (hours(24), feeding(115.0, 14.0, "Previous day feeding")),
        (
            hours(12),
            sleep(hours(4), SleepType::Night, "excellent", "Full night sleep, 8 hours"),
        ),
        (hours(6), feeding(110.0, 12.0, "Morning feeding")),
        (hours(2), feeding(120.0, 15.0, "Fed well, no issues")),
        (
            hours(2),
            sleep(minutes(30), SleepType::Nap, "good", "Peaceful afternoon nap"),
        ),
        (
            now,
            growth(4.2, 52.0, 35.5, "Healthy growth pattern, following 50th percentile"),
        ),
    ]
}

/// Register the demo subject and its history.
///
/// Returns the number of events written, or zero when the subject already
/// exists.
pub fn seed_store(store: &SqliteStore, now: DateTime<Utc>) -> StorageResult<usize> {
    match store.insert_subject(&demo_subject()) {
        Ok(()) => {}
        Err(StorageError::SubjectExists(_)) => {
            tracing::info!(subject_id = DEMO_SUBJECT_ID, "Demo data already present");
            return Ok(0);
        }
        Err(e) => return Err(e),
    }

    let events = demo_events(now);
    for (occurred_at, payload) in &events {
        store.insert_event(&Event::new(DEMO_SUBJECT_ID, *occurred_at, payload.clone()))?;
    }

    tracing::info!(subject_id = DEMO_SUBJECT_ID, events = events.len(), "Seeded demo data");
    Ok(events.len())
}
