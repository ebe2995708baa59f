use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use mnemo_core::{MemoryScope, MemoryUnit, MnemoError, Result, Tier};

use crate::episodic::EpisodicStore;
use crate::semantic::SemanticStore;
use crate::working::WorkingStore;

/// Unified memory store combining all three memory tiers.
pub struct MemoryStore {
    pub working: WorkingStore,
    pub episodic: EpisodicStore,
    pub semantic: SemanticStore,
}

impl MemoryStore {
    /// Open or create the memory database at the given path.
    ///
    /// `embedding_dims` fixes the dimensionality of the semantic index (0 = unchecked).
    pub fn open(path: &Path, embedding_dims: usize) -> Result<Self> {
        info!(?path, embedding_dims, "opening memory store");

        let conn = Connection::open(path).map_err(|e| MnemoError::storage(Tier::Episodic, e))?;

        // WAL for concurrent readers; FULL sync so an acknowledged append survives a crash.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")
            .map_err(|e| MnemoError::storage(Tier::Episodic, e))?;
        EpisodicStore::init_schema(&conn).map_err(|e| MnemoError::storage(Tier::Episodic, e))?;
        SemanticStore::init_schema(&conn).map_err(|e| MnemoError::storage(Tier::Semantic, e))?;

        let db = Arc::new(Mutex::new(conn));
        let store = Self {
            working: WorkingStore::new(),
            episodic: EpisodicStore::new(Arc::clone(&db)),
            semantic: SemanticStore::new(db, embedding_dims),
        };

        let events = store.episodic.count()?;
        let records = store.semantic.count()?;
        info!(
            events,
            records,
            last_sequence = store.episodic.last_sequence()?,
            "memory store ready"
        );
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory(embedding_dims: usize) -> Result<Self> {
        Self::open(Path::new(":memory:"), embedding_dims)
    }

    /// Everything currently visible to a session: its live working memory, its
    /// episodic timeline and the active session-scoped semantic units it produced.
    pub fn visible_units(&self, session_id: &str) -> Result<Vec<MemoryUnit>> {
        let mut units = self.working.get_active(session_id);
        units.extend(
            self.episodic
                .timeline(session_id)?
                .into_iter()
                .map(|e| e.unit),
        );
        units.extend(
            self.semantic
                .by_scope(MemoryScope::Session)?
                .into_iter()
                .filter(|u| u.source_session == session_id),
        );
        Ok(units)
    }
}
