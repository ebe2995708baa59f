use thiserror::Error;

use crate::types::{Lifecycle, MemoryId, Tier};

/// Unified error type for the Mnemo memory router.
#[derive(Error, Debug)]
pub enum MnemoError {
    // ── Candidate errors ───────────────────────────────────────
    #[error("invalid memory unit {unit_id}: {reason}")]
    Validation { unit_id: String, reason: String },

    #[error("invalid lifecycle transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: MemoryId,
        from: Lifecycle,
        to: Lifecycle,
    },

    // ── Storage errors ─────────────────────────────────────────
    #[error("{tier} storage error: {reason}")]
    Storage { tier: Tier, reason: String },

    #[error("memory {id} not found in {tier} tier")]
    NotFound { tier: Tier, id: MemoryId },

    // ── External collaborator errors ───────────────────────────
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MnemoError {
    /// Shorthand for a storage failure in the given tier.
    pub fn storage(tier: Tier, reason: impl ToString) -> Self {
        MnemoError::Storage {
            tier,
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort the current request.
    ///
    /// Validation and not-found errors are scoped to a single unit; storage and
    /// embedding failures are not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MnemoError::Storage { .. } | MnemoError::Embedding(_) | MnemoError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MnemoError>;
