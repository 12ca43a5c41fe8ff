//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::insights::{FeedbackRecorder, InsightService, InsightSettings};
use crate::storage::SqliteStore;

/// Shared application state for all handlers
pub struct AppState {
    /// Subjects and the event log
    pub store: Arc<SqliteStore>,
    /// Cached insight computation
    pub insights: Arc<InsightService>,
    pub feedback: Arc<FeedbackRecorder>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Build every service on top of one store
    pub fn new(store: Arc<SqliteStore>, settings: &InsightSettings, config: ApiConfig) -> Self {
        let insights = Arc::new(InsightService::with_store(store.clone(), settings));
        let feedback = Arc::new(FeedbackRecorder::new(store.clone()));

        Self {
            store,
            insights,
            feedback,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
