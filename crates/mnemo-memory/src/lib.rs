//! # mnemo-memory
//!
//! Three-tier memory for conversational agents:
//!
//! - **Working memory**: recent, session-local units with a TTL (in-memory, ephemeral).
//! - **Episodic memory**: strictly ordered, append-only decision log (SQLite, persistent).
//! - **Semantic memory**: confidence-scored units searchable by embedding similarity
//!   (SQLite + cosine scan, persistent).
//!
//! Episodic and semantic tiers share one SQLite connection opened by [`MemoryStore`].

pub mod episodic;
mod row;
pub mod semantic;
pub mod store;
pub mod working;

pub use episodic::{EpisodicEvent, EpisodicStore};
pub use semantic::{SemanticRecord, SemanticStore, cosine_similarity};
pub use store::MemoryStore;
pub use working::{WorkingMemoryEntry, WorkingStore};
