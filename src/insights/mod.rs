//! Smart Care insight engine
//!
//! Heuristic predictions over a subject's recent care events:
//!
//! - **feeding**: next feeding from the mean feeding interval
//! - **nap**: next nap from the average local nap start hour
//! - **growth**: weight and height direction from first and last readings
//! - **snapshot**: the three results bundled per subject
//! - **cache**: short-lived snapshot cache with a fixed TTL
//! - **feedback**: accuracy votes on the predictions
//! - **service**: ties the store, analyzers and cache together
//!
//! Analyzers are pure functions. Thin data is reported as a low-confidence
//! result, never as an error.

pub mod cache;
pub mod error;
pub mod feedback;
pub mod feeding;
pub mod growth;
pub mod nap;
pub mod normalizer;
pub mod service;
pub mod snapshot;

pub use cache::{InsightCache, DEFAULT_CACHE_TTL_SECS};
pub use error::InsightError;
pub use feedback::{FeedbackError, FeedbackRecorder, FeedbackSubmission};
pub use feeding::{analyze_feedings, FeedingInsight};
pub use growth::{analyze_growth, GrowthInsight, MeasurementTrend, TrendDirection};
pub use nap::{analyze_naps, SleepInsight};
pub use normalizer::{CareSeries, GrowthSample, SleepSample};
pub use service::{FetchLimits, InsightService, InsightSettings};
pub use snapshot::{aggregate, InsightSnapshot};

/// Confidence reported whenever there is too little data to predict
pub const LOW_DATA_CONFIDENCE: f64 = 0.3;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
