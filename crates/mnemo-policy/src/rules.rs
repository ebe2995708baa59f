use mnemo_core::{MemoryKind, MemoryScope, MemoryUnit, Tier};
use serde::Serialize;

/// What a matching rule does with the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "tier")]
pub enum RuleAction {
    /// Store in the given tier.
    Store(Tier),
    /// Store in the given tier and flag same-kind, same-scope units it supersedes.
    StoreAndSupersede(Tier),
    /// Do not store.
    Reject,
}

/// One row of the decision table.
#[derive(Clone)]
pub struct PolicyRule {
    pub name: &'static str,
    pub reason: &'static str,
    pub matches: fn(&MemoryUnit) -> bool,
    pub action: RuleAction,
}

impl std::fmt::Debug for PolicyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}

impl PolicyRule {
    pub fn applies_to(&self, unit: &MemoryUnit) -> bool {
        (self.matches)(unit)
    }
}

/// The built-in table. Order is significant.
pub fn default_rules() -> Vec<PolicyRule> {
    vec![
        PolicyRule {
            name: "high_confidence_decision",
            reason: "high confidence decision",
            matches: |u| u.kind == MemoryKind::Decision && u.confidence > 0.8,
            action: RuleAction::Store(Tier::Semantic),
        },
        PolicyRule {
            name: "long_lived_constraint",
            reason: "project or global constraint is long-term knowledge",
            matches: |u| {
                u.kind == MemoryKind::Constraint
                    && matches!(u.scope, MemoryScope::Project | MemoryScope::Global)
            },
            action: RuleAction::Store(Tier::Semantic),
        },
        PolicyRule {
            name: "session_fact",
            reason: "session fact is only relevant for now",
            matches: |u| u.kind == MemoryKind::Fact && u.scope == MemoryScope::Session,
            action: RuleAction::Store(Tier::Working),
        },
        PolicyRule {
            name: "decision_event",
            reason: "decision appended to the episodic log",
            matches: |u| u.kind == MemoryKind::Decision,
            action: RuleAction::StoreAndSupersede(Tier::Episodic),
        },
        PolicyRule {
            name: "low_confidence_question",
            reason: "low confidence question not worth storing",
            matches: |u| u.kind == MemoryKind::Question && u.confidence < 0.5,
            action: RuleAction::Reject,
        },
        PolicyRule {
            name: "high_confidence_fact",
            reason: "high confidence fact is stable knowledge",
            matches: |u| u.kind == MemoryKind::Fact && u.confidence > 0.7,
            action: RuleAction::Store(Tier::Semantic),
        },
        PolicyRule {
            name: "default",
            reason: "default: working memory with TTL",
            matches: |_| true,
            action: RuleAction::Store(Tier::Working),
        },
    ]
}
