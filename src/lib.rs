//! # SmartCare
//!
//! Baby-care tracking with heuristic "Smart Care" predictions: when the next
//! feeding is due, when the next nap window opens, and which way weight and
//! height are trending.
//!
//! ## Modules
//!
//! - [`storage`]: SQLite store for subjects, events, the insight cache and feedback
//! - [`insights`]: Analyzers, aggregation, caching and feedback recording
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`seed`]: Demo data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smartcare::insights::{InsightService, InsightSettings};
//! use smartcare::storage::{Event, EventPayload, FeedingDetails, SqliteStore, Subject};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open(std::path::Path::new("./smartcare_data"))?);
//!     store.insert_subject(&Subject::new("baby_001", "Emma").timezone("Asia/Kolkata"))?;
//!
//!     for hours_ago in [9, 6, 3] {
//!         store.insert_event(&Event::new(
//!             "baby_001",
//!             chrono::Utc::now() - chrono::Duration::hours(hours_ago),
//!             EventPayload::Feeding(FeedingDetails::default()),
//!         ))?;
//!     }
//!
//!     let service = InsightService::with_store(store, &InsightSettings::default());
//!     let snapshot = service.insights("baby_001").await?;
//!
//!     println!("{}", snapshot.feeding.message);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod insights;
pub mod seed;
pub mod storage;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StorageConfig};

pub use insights::{
    FeedbackRecorder, InsightCache, InsightError, InsightService, InsightSettings, InsightSnapshot,
};

pub use storage::{
    Event, EventKind, EventPayload, FeedbackRecord, InsightType, SqliteStore, StorageError,
    StorageResult, Subject,
};
