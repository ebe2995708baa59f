use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use mnemo_core::{EventType, MemoryUnit, MnemoError, Result, Tier};

use crate::row::{RawUnit, metadata_json, to_db_time};

/// One entry of the append-only decision log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodicEvent {
    pub unit: MemoryUnit,
    /// Strictly increasing across the whole store, never reused.
    pub sequence_number: i64,
    pub event_type: EventType,
}

const SELECT_EVENTS: &str = "SELECT sequence_number, event_type, id, kind, content, scope, confidence,
        lifecycle, source_session, created_at, updated_at, metadata
 FROM episodic_events";

fn db_err(e: impl ToString) -> MnemoError {
    MnemoError::storage(Tier::Episodic, e)
}

/// Episodic memory: the permanent, strictly ordered audit trail.
///
/// Rows are only ever inserted. Sequence numbers come from SQLite's
/// `AUTOINCREMENT` under the shared connection lock, so concurrent appends can
/// never observe the same number and numbers are never reused.
pub struct EpisodicStore {
    db: Arc<Mutex<Connection>>,
}

impl EpisodicStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS episodic_events (
                sequence_number INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT NOT NULL,
                scope TEXT NOT NULL,
                confidence REAL NOT NULL,
                lifecycle TEXT NOT NULL,
                source_session TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}'
            );

            CREATE INDEX IF NOT EXISTS idx_episodic_unit ON episodic_events(id);
            CREATE INDEX IF NOT EXISTS idx_episodic_session ON episodic_events(source_session, sequence_number);
            CREATE INDEX IF NOT EXISTS idx_episodic_created ON episodic_events(created_at);
            CREATE INDEX IF NOT EXISTS idx_episodic_type ON episodic_events(event_type, sequence_number);
            ",
        )
    }

    /// Append a unit to the log and return the recorded event.
    ///
    /// The insert is a single statement: either the whole row lands with its
    /// sequence number or nothing is written.
    pub fn append(&self, unit: &MemoryUnit, event_type: EventType) -> Result<EpisodicEvent> {
        let db = self.db.lock();
        db.execute(
            "INSERT INTO episodic_events (
                id, event_type, kind, content, scope, confidence, lifecycle,
                source_session, created_at, updated_at, metadata
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                unit.id.to_string(),
                event_type.as_str(),
                unit.kind.as_str(),
                &unit.content,
                unit.scope.as_str(),
                unit.confidence,
                unit.lifecycle.as_str(),
                &unit.source_session,
                to_db_time(&unit.created_at),
                to_db_time(&unit.updated_at),
                metadata_json(unit),
            ],
        )
        .map_err(db_err)?;
        let sequence_number = db.last_insert_rowid();
        debug!(unit_id = %unit.id, sequence_number, %event_type, "episodic append");

        Ok(EpisodicEvent {
            unit: unit.clone(),
            sequence_number,
            event_type,
        })
    }

    /// Every event of a session, oldest first. Creation order is causal order.
    pub fn timeline(&self, session_id: &str) -> Result<Vec<EpisodicEvent>> {
        self.query(
            &format!("{SELECT_EVENTS} WHERE source_session = ?1 ORDER BY sequence_number ASC"),
            params![session_id],
        )
    }

    /// The last `limit` events of a session, oldest first.
    pub fn timeline_tail(&self, session_id: &str, limit: usize) -> Result<Vec<EpisodicEvent>> {
        let mut events = self.query(
            &format!(
                "{SELECT_EVENTS} WHERE source_session = ?1 ORDER BY sequence_number DESC LIMIT ?2"
            ),
            params![session_id, limit as i64],
        )?;
        events.reverse();
        Ok(events)
    }

    /// The globally most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<EpisodicEvent>> {
        let mut events = self.query(
            &format!("{SELECT_EVENTS} ORDER BY sequence_number DESC LIMIT ?1"),
            params![limit as i64],
        )?;
        events.reverse();
        Ok(events)
    }

    /// The most recent `limit` events of one type, newest first.
    pub fn by_type(&self, event_type: EventType, limit: usize) -> Result<Vec<EpisodicEvent>> {
        self.query(
            &format!(
                "{SELECT_EVENTS} WHERE event_type = ?1 ORDER BY sequence_number DESC LIMIT ?2"
            ),
            params![event_type.as_str(), limit as i64],
        )
    }

    /// Events whose unit was created within `[start, end]`, oldest first.
    pub fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EpisodicEvent>> {
        self.query(
            &format!(
                "{SELECT_EVENTS} WHERE created_at BETWEEN ?1 AND ?2 ORDER BY sequence_number ASC"
            ),
            params![to_db_time(&start), to_db_time(&end)],
        )
    }

    pub fn count_for_session(&self, session_id: &str) -> Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row(
                "SELECT COUNT(*) FROM episodic_events WHERE source_session = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        Ok(n as usize)
    }

    pub fn count(&self) -> Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row("SELECT COUNT(*) FROM episodic_events", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(n as usize)
    }

    /// Highest sequence number handed out so far (0 when empty).
    pub fn last_sequence(&self) -> Result<i64> {
        let db = self.db.lock();
        db.query_row(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM episodic_events",
            [],
            |row| row.get(0),
        )
        .map_err(db_err)
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<EpisodicEvent>> {
        let rows: Vec<(i64, String, RawUnit)> = {
            let db = self.db.lock();
            let mut stmt = db.prepare(sql).map_err(db_err)?;
            let rows = stmt
                .query_map(args, |row| {
                    Ok((
                        row.get::<_, i64>("sequence_number")?,
                        row.get::<_, String>("event_type")?,
                        RawUnit::from_row(row)?,
                    ))
                })
                .map_err(db_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(db_err)?;
            rows
        };

        rows.into_iter()
            .map(|(sequence_number, event_type, raw)| {
                Ok(EpisodicEvent {
                    unit: raw.into_unit().map_err(db_err)?,
                    sequence_number,
                    event_type: event_type.parse().map_err(db_err)?,
                })
            })
            .collect()
    }
}
