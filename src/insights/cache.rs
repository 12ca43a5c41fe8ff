//! Insight cache
//!
//! Short-lived snapshots keyed by subject id. Expiry is checked against the
//! stored creation time on every read, so a stale row is never served even
//! if the sweeper has not removed it yet.
//!
//! Logging new events does not invalidate a cached snapshot; readers may see
//! predictions up to one TTL old.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::time::interval;

use crate::insights::error::InsightError;
use crate::insights::snapshot::InsightSnapshot;
use crate::storage::{CacheEntry, InsightCacheStore};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub struct InsightCache {
    store: Arc<dyn InsightCacheStore>,
    ttl: Duration,
}

impl InsightCache {
    pub fn new(store: Arc<dyn InsightCacheStore>, ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1000);
        Self {
            store,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Snapshot stored for `subject_id` if it was written less than one TTL
    /// before `now`
    pub async fn get(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<InsightSnapshot>, InsightError> {
        let entry = match self.store.load(subject_id).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if now >= entry.created_at + self.ttl {
            tracing::debug!(subject_id = %subject_id, "Cached insights expired");
            return Ok(None);
        }

        match serde_json::from_value(entry.snapshot) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(
                    subject_id = %subject_id,
                    error = %e,
                    "Discarding unreadable cached insights"
                );
                Ok(None)
            }
        }
    }

    /// Store `snapshot` as written at `now`, replacing any previous one
    pub async fn put(
        &self,
        snapshot: &InsightSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), InsightError> {
        let entry = CacheEntry {
            subject_id: snapshot.subject_id.clone(),
            snapshot: serde_json::to_value(snapshot)
                .map_err(|e| InsightError::Serialization(e.to_string()))?,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.store.save(entry).await?;
        Ok(())
    }

    /// Remove expired rows from the underlying store
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, InsightError> {
        Ok(self.store.purge_expired(now).await?)
    }

    /// Start a task that purges expired rows every `every`
    pub fn start_sweeper(self: &Arc<Self>, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(every);

            loop {
                ticker.tick().await;

                match cache.purge_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "Purged expired insight cache rows"),
                    Err(e) => tracing::error!("Insight cache sweep failed: {}", e),
                }
            }
        })
    }
}
