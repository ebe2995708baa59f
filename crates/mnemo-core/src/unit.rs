use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MnemoError, Result};
use crate::types::{Lifecycle, MemoryId, MemoryKind, MemoryScope, SessionId};

/// Confidence assigned to a candidate when the extractor gives none.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// The atomic fact, decision, question, constraint or assumption extracted from
/// a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUnit {
    pub id: MemoryId,
    #[serde(rename = "type")]
    pub kind: MemoryKind,
    pub content: String,
    pub scope: MemoryScope,
    /// Confidence score 0.0-1.0.
    pub confidence: f64,
    #[serde(default)]
    pub lifecycle: Lifecycle,
    pub source_session: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present once the unit has been placed in the semantic tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Provenance notes (deprecation reason, extractor hints, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl MemoryUnit {
    /// Create an active unit with a fresh id and the default confidence.
    pub fn new(
        kind: MemoryKind,
        content: impl Into<String>,
        scope: MemoryScope,
        source_session: impl Into<SessionId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            scope,
            confidence: DEFAULT_CONFIDENCE,
            lifecycle: Lifecycle::Active,
            source_session: source_session.into(),
            created_at: now,
            updated_at: now,
            embedding: None,
            metadata: Default::default(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Reject candidates that no tier may hold.
    pub fn validate(&self) -> Result<()> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(MnemoError::Validation {
                unit_id: self.id.to_string(),
                reason: format!("confidence {} is outside [0.0, 1.0]", self.confidence),
            });
        }
        if self.content.trim().is_empty() {
            return Err(MnemoError::Validation {
                unit_id: self.id.to_string(),
                reason: "content is empty".into(),
            });
        }
        if self.source_session.is_empty() {
            return Err(MnemoError::Validation {
                unit_id: self.id.to_string(),
                reason: "source_session is empty".into(),
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Move to a new lifecycle state, bumping `updated_at`.
    pub fn transition(&mut self, next: Lifecycle) -> Result<()> {
        if !self.lifecycle.can_transition_to(next) {
            return Err(MnemoError::InvalidTransition {
                id: self.id,
                from: self.lifecycle,
                to: next,
            });
        }
        self.lifecycle = next;
        self.touch();
        Ok(())
    }

    /// Mark the unit as mutated now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
