use mnemo_config::PolicyConfig;
use mnemo_core::{MemoryId, MemoryScope, MemoryUnit, PolicyDecision};
use tracing::{debug, info};

use crate::overlap::lexical_overlap;
use crate::rules::{PolicyRule, RuleAction, default_rules};

/// Rough number of tokens one working-memory unit costs in a prompt.
const TOKENS_PER_UNIT: usize = 100;

/// Working-memory TTL per scope, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionTable {
    pub session: u64,
    pub project: u64,
    pub global: u64,
}

impl Default for RetentionTable {
    fn default() -> Self {
        Self {
            session: 3600,
            project: 86_400,
            global: 604_800,
        }
    }
}

/// Stateless routing engine. The same `(candidate, existing)` input always
/// yields the same decision.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    rules: Vec<PolicyRule>,
    retention: RetentionTable,
    overlap_threshold: f64,
    summarize_token_threshold: usize,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyEngine {
    pub fn new() -> Self {
        Self::from_config(&PolicyConfig::default())
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            rules: default_rules(),
            retention: RetentionTable {
                session: config.session_ttl_secs,
                project: config.project_ttl_secs,
                global: config.global_ttl_secs,
            },
            overlap_threshold: config.overlap_threshold,
            summarize_token_threshold: config.summarize_token_threshold,
        }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold
    }

    /// Route one candidate. Invalid candidates are rejected with rule `validation`.
    pub fn evaluate(&self, candidate: &MemoryUnit, existing: &[MemoryUnit]) -> PolicyDecision {
        if let Err(e) = candidate.validate() {
            debug!(unit = %candidate.id, error = %e, "candidate failed validation");
            return PolicyDecision::invalid(e.to_string());
        }

        let Some(rule) = self.rules.iter().find(|r| r.applies_to(candidate)) else {
            // The built-in table ends with a catch-all, so this only happens
            // with a custom table that leaves gaps.
            return PolicyDecision::reject("none", "no rule matched");
        };

        let decision = match rule.action {
            RuleAction::Store(tier) => PolicyDecision::store(tier, rule.name, rule.reason),
            RuleAction::StoreAndSupersede(tier) => {
                let mut decision = PolicyDecision::store(tier, rule.name, rule.reason);
                decision.deprecate_existing = self.superseded_by(candidate, existing);
                if !decision.deprecate_existing.is_empty() {
                    info!(
                        unit = %candidate.id,
                        superseded = decision.deprecate_existing.len(),
                        "candidate supersedes existing memory"
                    );
                }
                decision
            }
            RuleAction::Reject => PolicyDecision::reject(rule.name, rule.reason),
        };

        debug!(
            unit = %candidate.id,
            kind = %candidate.kind,
            rule = rule.name,
            target = ?decision.target_store,
            "policy decision"
        );
        decision
    }

    /// Evaluate each candidate against the same `existing` snapshot, in order.
    pub fn evaluate_batch(
        &self,
        candidates: &[MemoryUnit],
        existing: &[MemoryUnit],
    ) -> Vec<PolicyDecision> {
        candidates
            .iter()
            .map(|c| self.evaluate(c, existing))
            .collect()
    }

    /// Ids of existing units with the same kind and scope whose content overlaps
    /// the candidate's above the threshold and whose confidence is strictly lower.
    fn superseded_by(&self, candidate: &MemoryUnit, existing: &[MemoryUnit]) -> Vec<MemoryId> {
        existing
            .iter()
            .filter(|e| e.kind == candidate.kind && e.scope == candidate.scope)
            .filter(|e| candidate.confidence > e.confidence)
            .filter(|e| lexical_overlap(&candidate.content, &e.content) > self.overlap_threshold)
            .map(|e| e.id)
            .collect()
    }

    pub fn ttl_for_scope(&self, scope: MemoryScope) -> u64 {
        match scope {
            MemoryScope::Session => self.retention.session,
            MemoryScope::Project => self.retention.project,
            MemoryScope::Global => self.retention.global,
        }
    }

    /// Whether `working_count` units would blow the given token budget.
    pub fn should_summarize(working_count: usize, token_threshold: usize) -> bool {
        working_count.saturating_mul(TOKENS_PER_UNIT) > token_threshold
    }

    /// [`Self::should_summarize`] against the configured budget.
    pub fn needs_summary(&self, working_count: usize) -> bool {
        Self::should_summarize(working_count, self.summarize_token_threshold)
    }
}
