//! Column mapping shared by the episodic and semantic tables.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;

use mnemo_core::MemoryUnit;

/// Fixed-width RFC 3339 so that TEXT comparison in SQLite orders chronologically.
pub(crate) fn to_db_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn from_db_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{s}': {e}"))
}

/// Raw unit columns as stored; converted into a [`MemoryUnit`] outside the row closure
/// so that enum parse failures surface as storage errors.
pub(crate) struct RawUnit {
    id: String,
    kind: String,
    content: String,
    scope: String,
    confidence: f64,
    lifecycle: String,
    source_session: String,
    created_at: String,
    updated_at: String,
    metadata: String,
}

impl RawUnit {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("kind")?,
            content: row.get("content")?,
            scope: row.get("scope")?,
            confidence: row.get("confidence")?,
            lifecycle: row.get("lifecycle")?,
            source_session: row.get("source_session")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            metadata: row.get("metadata")?,
        })
    }

    pub(crate) fn into_unit(self) -> Result<MemoryUnit, String> {
        let metadata = match serde_json::from_str::<serde_json::Value>(&self.metadata) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => Default::default(),
            Err(e) => return Err(format!("bad metadata for {}: {e}", self.id)),
        };
        Ok(MemoryUnit {
            id: self
                .id
                .parse()
                .map_err(|e| format!("bad id '{}': {e}", self.id))?,
            kind: self.kind.parse()?,
            content: self.content,
            scope: self.scope.parse()?,
            confidence: self.confidence,
            lifecycle: self.lifecycle.parse()?,
            source_session: self.source_session,
            created_at: from_db_time(&self.created_at)?,
            updated_at: from_db_time(&self.updated_at)?,
            embedding: None,
            metadata,
        })
    }
}

pub(crate) fn metadata_json(unit: &MemoryUnit) -> String {
    serde_json::Value::Object(unit.metadata.clone()).to_string()
}
