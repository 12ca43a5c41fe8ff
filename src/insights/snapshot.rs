//! Insight aggregation
//!
//! Runs the three analyzers over one subject's series and bundles the
//! results. Every analyzer is total, so a snapshot always carries all three
//! sections even when every series is empty.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::feeding::{analyze_feedings, FeedingInsight};
use crate::insights::growth::{analyze_growth, GrowthInsight};
use crate::insights::nap::{analyze_naps, SleepInsight};
use crate::insights::normalizer::CareSeries;

/// Predictions for one subject at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSnapshot {
    pub subject_id: String,
    pub feeding: FeedingInsight,
    pub sleep: SleepInsight,
    pub growth: GrowthInsight,
    pub generated_at: DateTime<Utc>,
}

/// Build a snapshot; `now` carries the subject's timezone for nap timing
pub fn aggregate<Tz: TimeZone>(
    subject_id: &str,
    series: &CareSeries,
    now: &DateTime<Tz>,
) -> InsightSnapshot {
    InsightSnapshot {
        subject_id: subject_id.to_string(),
        feeding: analyze_feedings(&series.feeding),
        sleep: analyze_naps(&series.sleep, now),
        growth: analyze_growth(&series.growth),
        generated_at: now.with_timezone(&Utc),
    }
}
