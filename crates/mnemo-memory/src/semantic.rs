use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use mnemo_core::{
    Lifecycle, MemoryId, MemoryKind, MemoryScope, MemoryUnit, MnemoError, Result, Tier,
};

use crate::row::{RawUnit, from_db_time, metadata_json, to_db_time};

/// A unit in the semantic tier together with its vector and retrieval stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticRecord {
    pub unit: MemoryUnit,
    pub embedding: Vec<f32>,
    /// Incremented on every search hit.
    pub retrieval_count: u64,
    pub last_retrieved: Option<DateTime<Utc>>,
}

const SELECT_RECORDS: &str = "SELECT id, kind, content, scope, confidence, lifecycle, source_session,
        created_at, updated_at, metadata, embedding, retrieval_count, last_retrieved
 FROM semantic_records";

fn db_err(e: impl ToString) -> MnemoError {
    MnemoError::storage(Tier::Semantic, e)
}

/// Semantic memory: durable, confidence-scored knowledge searchable by cosine similarity.
///
/// Records are keyed by unit id. Confidence, lifecycle and retrieval stats change
/// in place; identity never does.
pub struct SemanticStore {
    db: Arc<Mutex<Connection>>,
    /// Fixed dimensionality of every vector in the index (0 = unchecked).
    dims: usize,
}

impl SemanticStore {
    pub fn new(db: Arc<Mutex<Connection>>, dims: usize) -> Self {
        Self { db, dims }
    }

    pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS semantic_records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                content TEXT NOT NULL,
                scope TEXT NOT NULL,
                confidence REAL NOT NULL,
                lifecycle TEXT NOT NULL,
                source_session TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                embedding BLOB NOT NULL,
                retrieval_count INTEGER NOT NULL DEFAULT 0,
                last_retrieved TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_semantic_scope ON semantic_records(scope, lifecycle);
            CREATE INDEX IF NOT EXISTS idx_semantic_lifecycle ON semantic_records(lifecycle, confidence);
            ",
        )
    }

    /// Index a unit under its id.
    ///
    /// Upserting an existing id replaces content, vector and metadata and resets
    /// retrieval stats. The stored lifecycle is kept and confidence can only go
    /// down; raising it is `reinforce`'s job. A deprecated record is never
    /// revived: upserting its id fails with `InvalidTransition`.
    pub fn upsert(&self, unit: &MemoryUnit, embedding: &[f32]) -> Result<()> {
        self.check_dims(embedding).map_err(|reason| MnemoError::Validation {
            unit_id: unit.id.to_string(),
            reason,
        })?;

        let db = self.db.lock();
        let changed = db.execute(
            "INSERT INTO semantic_records (
                id, kind, content, scope, confidence, lifecycle, source_session,
                created_at, updated_at, metadata, embedding, retrieval_count, last_retrieved
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, NULL)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                content = excluded.content,
                scope = excluded.scope,
                confidence = MIN(semantic_records.confidence, excluded.confidence),
                source_session = excluded.source_session,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                metadata = excluded.metadata,
                embedding = excluded.embedding,
                retrieval_count = 0,
                last_retrieved = NULL
             WHERE semantic_records.lifecycle <> 'deprecated'",
            params![
                unit.id.to_string(),
                unit.kind.as_str(),
                &unit.content,
                unit.scope.as_str(),
                unit.confidence,
                unit.lifecycle.as_str(),
                &unit.source_session,
                to_db_time(&unit.created_at),
                to_db_time(&unit.updated_at),
                metadata_json(unit),
                encode_embedding(embedding),
            ],
        )
        .map_err(db_err)?;
        if changed == 0 {
            return Err(MnemoError::InvalidTransition {
                id: unit.id,
                from: Lifecycle::Deprecated,
                to: unit.lifecycle,
            });
        }
        debug!(unit_id = %unit.id, "semantic upsert");
        Ok(())
    }

    /// Nearest-neighbour search over active units.
    ///
    /// Returns at most `top_k` units with `confidence >= min_confidence`, restricted
    /// to the given scope/kind allow-lists (an empty list means no restriction),
    /// ranked by cosine similarity descending. Every hit has its retrieval count
    /// incremented and `last_retrieved` set.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        scope_filter: Option<&[MemoryScope]>,
        type_filter: Option<&[MemoryKind]>,
        min_confidence: f64,
    ) -> Result<Vec<(MemoryUnit, f32)>> {
        self.check_dims(query_embedding).map_err(MnemoError::Embedding)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.query(
            &format!("{SELECT_RECORDS} WHERE lifecycle = ?1 AND confidence >= ?2"),
            params![Lifecycle::Active.as_str(), min_confidence],
        )?;

        let mut hits: Vec<(MemoryUnit, f32)> = candidates
            .into_iter()
            .filter(|r| scope_filter.is_none_or(|s| s.is_empty() || s.contains(&r.unit.scope)))
            .filter(|r| type_filter.is_none_or(|k| k.is_empty() || k.contains(&r.unit.kind)))
            .map(|r| {
                let similarity = cosine_similarity(query_embedding, &r.embedding);
                let mut unit = r.unit;
                unit.embedding = Some(r.embedding);
                (unit, similarity)
            })
            .collect();

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.created_at.cmp(&b.0.created_at))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        hits.truncate(top_k);

        if !hits.is_empty() {
            self.record_retrievals(hits.iter().map(|(u, _)| u.id))?;
        }
        Ok(hits)
    }

    fn record_retrievals(&self, ids: impl Iterator<Item = MemoryId>) -> Result<()> {
        let now = to_db_time(&Utc::now());
        let mut db = self.db.lock();
        let tx = db.transaction().map_err(db_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE semantic_records
                     SET retrieval_count = retrieval_count + 1, last_retrieved = ?1
                     WHERE id = ?2",
                )
                .map_err(db_err)?;
            for id in ids {
                stmt.execute(params![now, id.to_string()]).map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)
    }

    /// Mark a unit deprecated. It stays retrievable by id but never matches a search again.
    pub fn deprecate(&self, id: MemoryId) -> Result<()> {
        self.deprecate_with_provenance(id, serde_json::Map::new())
    }

    /// Deprecate and merge `provenance` into the unit's metadata.
    pub fn deprecate_with_provenance(
        &self,
        id: MemoryId,
        provenance: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let db = self.db.lock();
        let mut record = fetch(&db, id)?.ok_or(MnemoError::NotFound {
            tier: Tier::Semantic,
            id,
        })?;
        if record.unit.lifecycle == Lifecycle::Deprecated && provenance.is_empty() {
            return Ok(());
        }
        record.unit.transition(Lifecycle::Deprecated)?;
        record.unit.metadata.extend(provenance);

        db.execute(
            "UPDATE semantic_records SET lifecycle = ?1, updated_at = ?2, metadata = ?3 WHERE id = ?4",
            params![
                Lifecycle::Deprecated.as_str(),
                to_db_time(&record.unit.updated_at),
                metadata_json(&record.unit),
                id.to_string(),
            ],
        )
        .map_err(db_err)?;
        info!(unit_id = %id, "semantic unit deprecated");
        Ok(())
    }

    /// Raise confidence by `confidence_boost` (capped at 1.0) and mark the unit reinforced.
    /// Returns the new confidence.
    pub fn reinforce(&self, id: MemoryId, confidence_boost: f64) -> Result<f64> {
        if !confidence_boost.is_finite() || confidence_boost < 0.0 {
            return Err(MnemoError::Validation {
                unit_id: id.to_string(),
                reason: format!("confidence boost {confidence_boost} must be a non-negative number"),
            });
        }
        let db = self.db.lock();
        let mut record = fetch(&db, id)?.ok_or(MnemoError::NotFound {
            tier: Tier::Semantic,
            id,
        })?;
        record.unit.transition(Lifecycle::Reinforced)?;
        let confidence = (record.unit.confidence + confidence_boost).min(1.0);

        db.execute(
            "UPDATE semantic_records SET confidence = ?1, lifecycle = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                confidence,
                Lifecycle::Reinforced.as_str(),
                to_db_time(&record.unit.updated_at),
                id.to_string(),
            ],
        )
        .map_err(db_err)?;
        info!(unit_id = %id, confidence, "semantic unit reinforced");
        Ok(confidence)
    }

    /// All active units in a scope, unranked (creation order).
    pub fn by_scope(&self, scope: MemoryScope) -> Result<Vec<MemoryUnit>> {
        Ok(self
            .query(
                &format!(
                    "{SELECT_RECORDS} WHERE scope = ?1 AND lifecycle = ?2 ORDER BY created_at ASC"
                ),
                params![scope.as_str(), Lifecycle::Active.as_str()],
            )?
            .into_iter()
            .map(|r| r.unit)
            .collect())
    }

    /// Look up a record by id, whatever its lifecycle.
    pub fn get(&self, id: MemoryId) -> Result<Option<SemanticRecord>> {
        let db = self.db.lock();
        fetch(&db, id)
    }

    /// Number of records in the whole index, any lifecycle.
    pub fn count(&self) -> Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row("SELECT COUNT(*) FROM semantic_records", [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(n as usize)
    }

    fn check_dims(&self, embedding: &[f32]) -> std::result::Result<(), String> {
        if embedding.is_empty() {
            return Err("embedding is empty".into());
        }
        if self.dims > 0 && embedding.len() != self.dims {
            return Err(format!(
                "embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dims
            ));
        }
        Ok(())
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<SemanticRecord>> {
        let rows: Vec<RawRecord> = {
            let db = self.db.lock();
            let mut stmt = db.prepare(sql).map_err(db_err)?;
            let rows = stmt
                .query_map(args, RawRecord::from_row)
                .map_err(db_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(db_err)?;
            rows
        };
        rows.into_iter().map(RawRecord::into_record).collect()
    }
}

fn fetch(conn: &Connection, id: MemoryId) -> Result<Option<SemanticRecord>> {
    conn.query_row(
        &format!("{SELECT_RECORDS} WHERE id = ?1"),
        params![id.to_string()],
        RawRecord::from_row,
    )
    .optional()
    .map_err(db_err)?
    .map(RawRecord::into_record)
    .transpose()
}

struct RawRecord {
    unit: RawUnit,
    embedding: Vec<u8>,
    retrieval_count: i64,
    last_retrieved: Option<String>,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            unit: RawUnit::from_row(row)?,
            embedding: row.get("embedding")?,
            retrieval_count: row.get("retrieval_count")?,
            last_retrieved: row.get("last_retrieved")?,
        })
    }

    fn into_record(self) -> Result<SemanticRecord> {
        let unit = self.unit.into_unit().map_err(db_err)?;
        let embedding = decode_embedding(&self.embedding)
            .ok_or_else(|| db_err(format!("corrupt embedding for {}", unit.id)))?;
        let last_retrieved = self
            .last_retrieved
            .as_deref()
            .map(from_db_time)
            .transpose()
            .map_err(db_err)?;
        Ok(SemanticRecord {
            unit,
            embedding,
            retrieval_count: self.retrieval_count.max(0) as u64,
            last_retrieved,
        })
    }
}

/// Serialize an embedding as little-endian f32 bytes.
fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
