//! SQLite document store
//!
//! Single-file SQLite database holding subjects, the event log, the insight
//! cache and feedback. Every record except the cache is append-only; the
//! cache is one upserted row per subject.
//!
//! Event payloads are stored as JSON next to an indexed `kind` column, so
//! the tagged union is validated on the way in and checked again on the way
//! out.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{
    CacheEntry, Event, EventKind, EventPayload, FeedbackRecord, FeedbackTally, InsightType,
    Subject,
};
use crate::storage::{EventSource, FeedbackStore, InsightCacheStore, SubjectStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS subjects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        date_of_birth TEXT,
        timezone TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        subject_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        occurred_at INTEGER NOT NULL,
        payload TEXT NOT NULL,
        recorded_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_events_subject_kind_time
        ON events(subject_id, kind, occurred_at);

    CREATE TABLE IF NOT EXISTS insight_cache (
        subject_id TEXT PRIMARY KEY,
        snapshot TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_insight_cache_expires ON insight_cache(expires_at);

    CREATE TABLE IF NOT EXISTS feedback (
        id TEXT PRIMARY KEY,
        subject_id TEXT NOT NULL,
        insight_type TEXT NOT NULL,
        accurate INTEGER NOT NULL,
        submitted_by TEXT NOT NULL,
        submitted_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_feedback_subject ON feedback(subject_id, insight_type);
";

/// SQLite-backed store implementing every storage collaborator trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create or open the database file `smartcare.db` inside `data_dir`
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("smartcare.db");

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::init(conn, Some(path))
    }

    /// Open a private in-memory database (tests, benchmarks)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = ?path, "Store schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Cheap round trip used by readiness checks
    pub fn ping(&self) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ============================================
    // SUBJECTS
    // ============================================

    pub fn insert_subject(&self, subject: &Subject) -> StorageResult<()> {
        subject.validate()?;
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO subjects (id, name, date_of_birth, timezone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subject.id,
                subject.name,
                subject.date_of_birth.map(|d| d.to_string()),
                subject.timezone,
                subject.created_at.timestamp_millis(),
            ],
        )?;

        if inserted == 0 {
            return Err(StorageError::SubjectExists(subject.id.clone()));
        }

        tracing::info!(subject_id = %subject.id, "Registered subject");
        Ok(())
    }

    pub fn find_subject(&self, id: &str) -> StorageResult<Option<Subject>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                "SELECT id, name, date_of_birth, timezone, created_at FROM subjects WHERE id = ?1",
                params![id],
                RawSubject::from_row,
            )
            .optional()?;

        raw.map(RawSubject::into_subject).transpose()
    }

    pub fn all_subjects(&self) -> StorageResult<Vec<Subject>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, date_of_birth, timezone, created_at FROM subjects ORDER BY created_at, id",
        )?;

        let raws = stmt
            .query_map([], RawSubject::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(RawSubject::into_subject).collect()
    }

    fn subject_exists(conn: &Connection, id: &str) -> StorageResult<bool> {
        let found = conn
            .query_row("SELECT 1 FROM subjects WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    // ============================================
    // EVENTS
    // ============================================

    /// Validate and append an event for a known subject
    pub fn insert_event(&self, event: &Event) -> StorageResult<()> {
        event.payload.validate(event.occurred_at)?;
        let payload = serde_json::to_string(&event.payload)?;

        let conn = self.conn()?;
        if !Self::subject_exists(&conn, &event.subject_id)? {
            return Err(StorageError::SubjectNotFound(event.subject_id.clone()));
        }

        conn.execute(
            "INSERT INTO events (id, subject_id, kind, occurred_at, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id,
                event.subject_id,
                event.kind().as_str(),
                event.occurred_at.timestamp_millis(),
                payload,
                Utc::now().timestamp_millis(),
            ],
        )?;

        tracing::debug!(
            subject_id = %event.subject_id,
            kind = %event.kind(),
            event_id = %event.id,
            "Recorded event"
        );
        Ok(())
    }

    /// Most recent events first; ties resolve newest-recorded first
    pub fn recent_events(
        &self,
        subject_id: &str,
        kind: Option<EventKind>,
        limit: usize,
    ) -> StorageResult<Vec<Event>> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let raws = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, subject_id, kind, occurred_at, payload FROM events
                     WHERE subject_id = ?1 AND kind = ?2
                     ORDER BY occurred_at DESC, rowid DESC
                     LIMIT ?3",
                )?;
                let rows = stmt.query_map(params![subject_id, kind.as_str(), limit], RawEvent::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, subject_id, kind, occurred_at, payload FROM events
                     WHERE subject_id = ?1
                     ORDER BY occurred_at DESC, rowid DESC
                     LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![subject_id, limit], RawEvent::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        raws.into_iter().map(RawEvent::into_event).collect()
    }

    // ============================================
    // INSIGHT CACHE
    // ============================================

    pub fn load_cache_entry(&self, subject_id: &str) -> StorageResult<Option<CacheEntry>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT subject_id, snapshot, created_at, expires_at FROM insight_cache
                 WHERE subject_id = ?1",
                params![subject_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(subject_id, snapshot, created_at, expires_at)| -> StorageResult<CacheEntry> {
            Ok(CacheEntry {
                subject_id,
                snapshot: serde_json::from_str(&snapshot)?,
                created_at: from_millis(created_at)?,
                expires_at: from_millis(expires_at)?,
            })
        })
        .transpose()
    }

    /// Upsert; the latest write for a subject wins
    pub fn save_cache_entry(&self, entry: &CacheEntry) -> StorageResult<()> {
        let snapshot = serde_json::to_string(&entry.snapshot)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO insight_cache (subject_id, snapshot, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(subject_id) DO UPDATE SET
                snapshot = excluded.snapshot,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at",
            params![
                entry.subject_id,
                snapshot,
                entry.created_at.timestamp_millis(),
                entry.expires_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    pub fn delete_expired_cache(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM insight_cache WHERE expires_at <= ?1",
            params![now.timestamp_millis()],
        )?;
        Ok(removed)
    }

    // ============================================
    // FEEDBACK
    // ============================================

    pub fn insert_feedback(&self, record: &FeedbackRecord) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO feedback (id, subject_id, insight_type, accurate, submitted_by, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.subject_id,
                record.insight_type.as_str(),
                record.accurate,
                record.submitted_by,
                record.submitted_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    /// Vote counts per insight type; types without votes report zeros
    pub fn feedback_tallies(&self, subject_id: &str) -> StorageResult<Vec<FeedbackTally>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT insight_type,
                    SUM(CASE WHEN accurate THEN 1 ELSE 0 END),
                    SUM(CASE WHEN accurate THEN 0 ELSE 1 END)
             FROM feedback WHERE subject_id = ?1
             GROUP BY insight_type",
        )?;

        let rows = stmt
            .query_map(params![subject_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tallies: Vec<FeedbackTally> = InsightType::all()
            .iter()
            .map(|&insight_type| FeedbackTally {
                insight_type,
                accurate: 0,
                inaccurate: 0,
            })
            .collect();

        for (insight_type, accurate, inaccurate) in rows {
            let insight_type: InsightType = insight_type
                .parse()
                .map_err(StorageError::Corruption)?;
            if let Some(tally) = tallies.iter_mut().find(|t| t.insight_type == insight_type) {
                tally.accurate = accurate.max(0) as u64;
                tally.inaccurate = inaccurate.max(0) as u64;
            }
        }

        Ok(tallies)
    }
}

fn from_millis(ms: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::Corruption(format!("timestamp out of range: {}", ms)))
}

/// Row image read under the lock, converted after
struct RawSubject {
    id: String,
    name: String,
    date_of_birth: Option<String>,
    timezone: String,
    created_at: i64,
}

impl RawSubject {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            date_of_birth: row.get(2)?,
            timezone: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_subject(self) -> StorageResult<Subject> {
        let date_of_birth = self
            .date_of_birth
            .map(|s| {
                s.parse::<NaiveDate>()
                    .map_err(|e| StorageError::Corruption(format!("date_of_birth '{}': {}", s, e)))
            })
            .transpose()?;

        Ok(Subject {
            id: self.id,
            name: self.name,
            date_of_birth,
            timezone: self.timezone,
            created_at: from_millis(self.created_at)?,
        })
    }
}

struct RawEvent {
    id: String,
    subject_id: String,
    kind: String,
    occurred_at: i64,
    payload: String,
}

impl RawEvent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            subject_id: row.get(1)?,
            kind: row.get(2)?,
            occurred_at: row.get(3)?,
            payload: row.get(4)?,
        })
    }

    fn into_event(self) -> StorageResult<Event> {
        let payload: EventPayload = serde_json::from_str(&self.payload)?;
        if payload.kind().as_str() != self.kind {
            return Err(StorageError::Corruption(format!(
                "event {} is indexed as '{}' but carries a '{}' payload",
                self.id,
                self.kind,
                payload.kind()
            )));
        }

        Ok(Event {
            id: self.id,
            subject_id: self.subject_id,
            occurred_at: from_millis(self.occurred_at)?,
            payload,
        })
    }
}

#[async_trait]
impl SubjectStore for SqliteStore {
    async fn create_subject(&self, subject: Subject) -> StorageResult<Subject> {
        self.insert_subject(&subject)?;
        Ok(subject)
    }

    async fn get_subject(&self, id: &str) -> StorageResult<Option<Subject>> {
        self.find_subject(id)
    }

    async fn list_subjects(&self) -> StorageResult<Vec<Subject>> {
        self.all_subjects()
    }
}

#[async_trait]
impl EventSource for SqliteStore {
    async fn fetch_events(
        &self,
        subject_id: &str,
        kind: EventKind,
        limit: usize,
    ) -> StorageResult<Vec<Event>> {
        self.recent_events(subject_id, Some(kind), limit)
    }
}

#[async_trait]
impl InsightCacheStore for SqliteStore {
    async fn load(&self, subject_id: &str) -> StorageResult<Option<CacheEntry>> {
        self.load_cache_entry(subject_id)
    }

    async fn save(&self, entry: CacheEntry) -> StorageResult<()> {
        self.save_cache_entry(&entry)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        self.delete_expired_cache(now)
    }
}

#[async_trait]
impl FeedbackStore for SqliteStore {
    async fn append(&self, record: FeedbackRecord) -> StorageResult<String> {
        self.insert_feedback(&record)?;
        Ok(record.id)
    }

    async fn summary(&self, subject_id: &str) -> StorageResult<Vec<FeedbackTally>> {
        self.feedback_tallies(subject_id)
    }
}
