use serde::{Deserialize, Serialize};

use crate::types::{MemoryId, Tier};

/// The policy engine's verdict for one candidate. A plain value: nothing
/// happens until the router applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub should_store: bool,
    pub target_store: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_override: Option<f64>,
    #[serde(default)]
    pub deprecate_existing: Vec<MemoryId>,
    pub reason: String,
    /// Name of the rule that produced this decision.
    #[serde(default)]
    pub rule: String,
}

impl PolicyDecision {
    pub fn store(target: Tier, rule: &str, reason: &str) -> Self {
        Self {
            should_store: true,
            target_store: Some(target),
            confidence_override: None,
            deprecate_existing: Vec::new(),
            reason: reason.to_string(),
            rule: rule.to_string(),
        }
    }

    pub fn reject(rule: &str, reason: &str) -> Self {
        Self {
            should_store: false,
            target_store: None,
            confidence_override: None,
            deprecate_existing: Vec::new(),
            reason: reason.to_string(),
            rule: rule.to_string(),
        }
    }

    /// A rejection produced by validation rather than by a policy rule.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            should_store: false,
            target_store: None,
            confidence_override: None,
            deprecate_existing: Vec::new(),
            reason: reason.into(),
            rule: "validation".into(),
        }
    }
}
