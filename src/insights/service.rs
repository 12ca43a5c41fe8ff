//! Insight service
//!
//! Serves a subject's snapshot from the cache when fresh, otherwise reads the
//! most recent events of each kind, runs the analyzers in the subject's
//! timezone and caches the result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::insights::cache::{InsightCache, DEFAULT_CACHE_TTL_SECS};
use crate::insights::error::InsightError;
use crate::insights::normalizer::CareSeries;
use crate::insights::snapshot::{aggregate, InsightSnapshot};
use crate::storage::{EventKind, EventSource, SqliteStore, SubjectStore};

/// How many of the most recent events of each kind feed the analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchLimits {
    #[serde(default = "default_feeding_limit")]
    pub feeding: usize,
    #[serde(default = "default_sleep_limit")]
    pub sleep: usize,
    #[serde(default = "default_growth_limit")]
    pub growth: usize,
}

fn default_feeding_limit() -> usize {
    20
}

fn default_sleep_limit() -> usize {
    15
}

fn default_growth_limit() -> usize {
    10
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            feeding: default_feeding_limit(),
            sleep: default_sleep_limit(),
            growth: default_growth_limit(),
        }
    }
}

impl FetchLimits {
    pub fn for_kind(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Feeding => self.feeding,
            EventKind::Sleep => self.sleep,
            EventKind::Growth => self.growth,
        }
    }
}

/// Tunables for the insight pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSettings {
    #[serde(default)]
    pub limits: FetchLimits,

    /// Cached snapshot lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How often the sweeper deletes expired cache rows
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            limits: FetchLimits::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

pub struct InsightService {
    subjects: Arc<dyn SubjectStore>,
    events: Arc<dyn EventSource>,
    cache: Arc<InsightCache>,
    limits: FetchLimits,
}

impl InsightService {
    pub fn new(
        subjects: Arc<dyn SubjectStore>,
        events: Arc<dyn EventSource>,
        cache: Arc<InsightCache>,
        limits: FetchLimits,
    ) -> Self {
        Self {
            subjects,
            events,
            cache,
            limits,
        }
    }

    /// Wire every collaborator to one SQLite store
    pub fn with_store(store: Arc<SqliteStore>, settings: &InsightSettings) -> Self {
        let cache = Arc::new(InsightCache::new(store.clone(), settings.cache_ttl_secs));
        Self::new(store.clone(), store, cache, settings.limits)
    }

    pub fn cache(&self) -> &Arc<InsightCache> {
        &self.cache
    }

    pub async fn insights(&self, subject_id: &str) -> Result<InsightSnapshot, InsightError> {
        self.insights_at(subject_id, Utc::now()).await
    }

    /// Snapshot for `subject_id` as of `now`
    pub async fn insights_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<InsightSnapshot, InsightError> {
        let subject = self
            .subjects
            .get_subject(subject_id)
            .await?
            .ok_or_else(|| InsightError::SubjectNotFound(subject_id.to_string()))?;

        if let Some(snapshot) = self.cache.get(subject_id, now).await? {
            tracing::debug!(subject_id = %subject_id, "Serving cached insights");
            return Ok(snapshot);
        }

        let (feedings, sleeps, growth) = tokio::try_join!(
            self.fetch(subject_id, EventKind::Feeding),
            self.fetch(subject_id, EventKind::Sleep),
            self.fetch(subject_id, EventKind::Growth),
        )?;

        // The store returns newest first; reversing keeps same-timestamp
        // events in recording order through the stable sort.
        let events = feedings
            .iter()
            .rev()
            .chain(sleeps.iter().rev())
            .chain(growth.iter().rev());
        let series = CareSeries::from_events(events);

        let local_now = now.with_timezone(&subject.tz());
        let snapshot = aggregate(subject_id, &series, &local_now);

        self.cache.put(&snapshot, now).await?;

        tracing::info!(
            subject_id = %subject_id,
            feedings = series.feeding.len(),
            sleeps = series.sleep.len(),
            growth = series.growth.len(),
            "Generated insights"
        );

        Ok(snapshot)
    }

    async fn fetch(
        &self,
        subject_id: &str,
        kind: EventKind,
    ) -> crate::storage::StorageResult<Vec<crate::storage::Event>> {
        self.events
            .fetch_events(subject_id, kind, self.limits.for_kind(kind))
            .await
    }
}
