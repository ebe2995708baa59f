use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use mnemo_core::{Lifecycle, MemoryId, MemoryUnit};

/// A working-memory slot: a unit plus its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingMemoryEntry {
    pub unit: MemoryUnit,
    pub ttl_seconds: u64,
    pub expires_at: DateTime<Utc>,
}

impl WorkingMemoryEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Working memory: recent, session-local units held in RAM with a TTL.
///
/// Nothing here survives a restart. Expired entries are evicted lazily by the
/// read paths or by an explicit [`WorkingStore::sweep`].
pub struct WorkingStore {
    entries: Mutex<HashMap<MemoryId, WorkingMemoryEntry>>,
}

impl Default for WorkingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or overwrite a unit by id, expiring `ttl_seconds` from now.
    pub fn put(&self, unit: MemoryUnit, ttl_seconds: u64) -> WorkingMemoryEntry {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(Duration::try_seconds(ttl).unwrap_or(Duration::MAX))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = WorkingMemoryEntry {
            unit,
            ttl_seconds,
            expires_at,
        };
        debug!(unit_id = %entry.unit.id, ttl_seconds, "working memory put");
        self.entries.lock().insert(entry.unit.id, entry.clone());
        entry
    }

    /// All live, active units for a session. Order is unspecified.
    pub fn get_active(&self, session_id: &str) -> Vec<MemoryUnit> {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, e| !e.is_expired(now));
        entries
            .values()
            .filter(|e| {
                e.unit.source_session == session_id && e.unit.lifecycle == Lifecycle::Active
            })
            .map(|e| e.unit.clone())
            .collect()
    }

    /// Look up a unit by id. Expired entries are evicted and reported as missing.
    pub fn get_by_id(&self, id: MemoryId) -> Option<MemoryUnit> {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        match entries.get(&id) {
            Some(e) if e.is_expired(now) => {
                entries.remove(&id);
                None
            }
            Some(e) => Some(e.unit.clone()),
            None => None,
        }
    }

    /// The full entry (with expiry) for a live unit.
    pub fn entry(&self, id: MemoryId) -> Option<WorkingMemoryEntry> {
        let now = Utc::now();
        self.entries
            .lock()
            .get(&id)
            .filter(|e| !e.is_expired(now))
            .cloned()
    }

    /// Remove every expired entry. Returns how many were evicted.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "swept expired working memory");
        }
        evicted
    }

    /// Number of entries currently held, including any not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry of a session.
    pub fn clear_session(&self, session_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| e.unit.source_session != session_id);
        before - entries.len()
    }
}
