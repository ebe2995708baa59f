use chrono::{DateTime, Utc};
use mnemo_core::{MemoryUnit, SessionId};
use serde::{Deserialize, Serialize};

/// Active memory pulled from each tier for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub working: Vec<MemoryUnit>,
    pub episodic: Vec<MemoryUnit>,
    pub semantic: Vec<MemoryUnit>,
}

/// Unit counts per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub working: usize,
    pub episodic: usize,
    pub semantic: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub total_memories: usize,
    pub memory_breakdown: TierBreakdown,
}

/// The composed, provider-neutral context handed to prompt rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextView {
    pub session_id: SessionId,
    pub user_message: String,
    pub working: Vec<MemoryUnit>,
    pub episodic: Vec<MemoryUnit>,
    pub semantic: Vec<MemoryUnit>,
    pub summary: ContextSummary,
}

impl ContextView {
    pub fn is_empty(&self) -> bool {
        self.summary.total_memories == 0
    }
}

/// Merge retrieved tiers into one view. Pure: same input, same output.
pub fn compose(
    session_id: &str,
    user_message: &str,
    working: Vec<MemoryUnit>,
    episodic: Vec<MemoryUnit>,
    semantic: Vec<MemoryUnit>,
) -> ContextView {
    let memory_breakdown = TierBreakdown {
        working: working.len(),
        episodic: episodic.len(),
        semantic: semantic.len(),
    };
    ContextView {
        session_id: session_id.to_string(),
        user_message: user_message.to_string(),
        working,
        episodic,
        semantic,
        summary: ContextSummary {
            total_memories: memory_breakdown.working
                + memory_breakdown.episodic
                + memory_breakdown.semantic,
            memory_breakdown,
        },
    }
}

/// Point-in-time counts for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub session_id: SessionId,
    pub working_count: usize,
    pub episodic_count: usize,
    /// Semantic records across every session, deprecated ones included.
    pub semantic_count_global: usize,
    pub timestamp: DateTime<Utc>,
}
