//! SmartCare Store
//!
//! This module provides persistence for everything the service records:
//!
//! - **types**: Core records (Subject, Event, FeedbackRecord, CacheEntry)
//! - **store**: SQLite implementation of every collaborator trait
//! - **error**: Error types
//!
//! The insight engine never talks to SQLite directly. It depends on the
//! collaborator traits below, so a different document store only needs to
//! implement them.
//!
//! # Example
//!
//! ```rust,no_run
//! use smartcare::storage::{EventPayload, Event, FeedingDetails, SqliteStore, Subject};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open(std::path::Path::new("./smartcare_data"))?;
//!
//!     store.insert_subject(&Subject::new("baby_001", "Emma").timezone("Asia/Kolkata"))?;
//!
//!     store.insert_event(&Event::new(
//!         "baby_001",
//!         chrono::Utc::now(),
//!         EventPayload::Feeding(FeedingDetails { amount_ml: Some(120.0), ..Default::default() }),
//!     ))?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use store::SqliteStore;
pub use types::{
    CacheEntry, Event, EventKind, EventPayload, FeedbackRecord, FeedbackTally, FeedingDetails,
    FeedingMethod, GrowthDetails, InsightType, SleepDetails, SleepType, Subject,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read access to the event log
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Up to `limit` events of one kind, most recent first
    async fn fetch_events(
        &self,
        subject_id: &str,
        kind: EventKind,
        limit: usize,
    ) -> StorageResult<Vec<Event>>;
}

/// Keyed storage for serialized insight snapshots
#[async_trait]
pub trait InsightCacheStore: Send + Sync {
    async fn load(&self, subject_id: &str) -> StorageResult<Option<CacheEntry>>;

    /// Replace any existing entry for the same subject
    async fn save(&self, entry: CacheEntry) -> StorageResult<()>;

    /// Drop entries whose expiry is at or before `now`, returning how many
    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<usize>;
}

/// Append-only feedback storage
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert a record and return its id
    async fn append(&self, record: FeedbackRecord) -> StorageResult<String>;

    async fn summary(&self, subject_id: &str) -> StorageResult<Vec<FeedbackTally>>;
}

/// Subject profiles
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn create_subject(&self, subject: Subject) -> StorageResult<Subject>;

    async fn get_subject(&self, id: &str) -> StorageResult<Option<Subject>>;

    async fn list_subjects(&self) -> StorageResult<Vec<Subject>>;
}
