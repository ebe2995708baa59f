use std::sync::Arc;

use chrono::Utc;
use mnemo_config::{MnemoConfig, RetrievalConfig};
use mnemo_core::{
    EventType, MemoryId, MemoryUnit, MnemoError, PolicyDecision, Result, Tier,
};
use mnemo_llm::{EmbeddingProvider, Extractor};
use mnemo_memory::MemoryStore;
use mnemo_policy::PolicyEngine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::{ContextView, MemoryStats, RetrievedContext, compose};

/// A candidate the router did not store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub unit_id: MemoryId,
    pub rule: String,
    pub reason: String,
}

/// Result of routing one batch of candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    /// Stored units, in candidate order, as written (override and embedding applied).
    pub stored: Vec<MemoryUnit>,
    /// One decision per candidate, in candidate order.
    pub decisions: Vec<PolicyDecision>,
    pub rejected: Vec<Rejection>,
    /// Non-fatal problems: missing deprecation targets, failed embeddings,
    /// attempts to rewrite a deprecated unit.
    pub warnings: Vec<String>,
    /// Working memory for the session exceeds the token budget.
    pub needs_summary: bool,
}

/// Routes memory units across the working, episodic and semantic tiers.
pub struct MemoryRouter {
    store: Arc<MemoryStore>,
    policy: PolicyEngine,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Option<Arc<dyn Extractor>>,
    retrieval: RetrievalConfig,
}

impl MemoryRouter {
    pub fn new(
        store: Arc<MemoryStore>,
        policy: PolicyEngine,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            store,
            policy,
            embedder,
            extractor: None,
            retrieval: RetrievalConfig::default(),
        }
    }

    /// Open the configured database and wire policy and retrieval settings from `config`.
    pub fn from_config(config: &MnemoConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let store = MemoryStore::open(&config.memory.db_path, config.memory.embedding_dims)?;
        Ok(Self::new(
            Arc::new(store),
            PolicyEngine::from_config(&config.policy),
            embedder,
        )
        .with_retrieval(config.retrieval.clone()))
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub(crate) fn extractor(&self) -> Option<&Arc<dyn Extractor>> {
        self.extractor.as_ref()
    }

    // ── Routing ────────────────────────────────────────────────

    /// Evaluate and store each candidate in order.
    ///
    /// Every candidate gets a decision, rejected ones included. Candidates are
    /// judged against the memory visible to the session when the batch starts;
    /// units stored or deprecated earlier in the batch do not change that
    /// snapshot. A storage failure aborts the batch and leaves earlier writes
    /// in place.
    pub async fn route_and_store(
        &self,
        session_id: &str,
        candidates: Vec<MemoryUnit>,
    ) -> Result<RouteOutcome> {
        let existing = self.store.visible_units(session_id)?;
        debug!(
            session_id,
            candidates = candidates.len(),
            existing = existing.len(),
            "routing candidates"
        );

        let mut outcome = RouteOutcome::default();
        for candidate in candidates {
            let decision = self.policy.evaluate(&candidate, &existing);

            match decision.target_store.filter(|_| decision.should_store) {
                Some(tier) => match self.write(candidate.clone(), &decision, tier).await {
                    Ok(unit) => {
                        info!(
                            unit_id = %unit.id,
                            session_id,
                            rule = %decision.rule,
                            tier = %tier,
                            "stored memory unit"
                        );
                        outcome.stored.push(unit);
                    }
                    Err(MnemoError::Embedding(reason)) => {
                        warn!(unit_id = %candidate.id, %reason, "embedding failed, unit not stored");
                        outcome.warnings.push(format!(
                            "unit {} not stored in {tier}: embedding failed: {reason}",
                            candidate.id
                        ));
                        outcome.rejected.push(Rejection {
                            unit_id: candidate.id,
                            rule: decision.rule.clone(),
                            reason: format!("embedding failed: {reason}"),
                        });
                    }
                    Err(e @ MnemoError::InvalidTransition { .. }) => {
                        warn!(unit_id = %candidate.id, error = %e, "unit not stored");
                        outcome
                            .warnings
                            .push(format!("unit {} not stored in {tier}: {e}", candidate.id));
                        outcome.rejected.push(Rejection {
                            unit_id: candidate.id,
                            rule: decision.rule.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                },
                None => {
                    info!(
                        unit_id = %candidate.id,
                        session_id,
                        rule = %decision.rule,
                        reason = %decision.reason,
                        "rejected memory unit"
                    );
                    outcome.rejected.push(Rejection {
                        unit_id: candidate.id,
                        rule: decision.rule.clone(),
                        reason: decision.reason.clone(),
                    });
                }
            }

            for &target in &decision.deprecate_existing {
                self.supersede(target, &candidate, &decision, &mut outcome.warnings)?;
            }
            outcome.decisions.push(decision);
        }

        outcome.needs_summary = self
            .policy
            .needs_summary(self.store.working.get_active(session_id).len());
        Ok(outcome)
    }

    /// Write one unit to `tier`, applying the decision's confidence override first.
    async fn write(
        &self,
        mut unit: MemoryUnit,
        decision: &PolicyDecision,
        tier: Tier,
    ) -> Result<MemoryUnit> {
        if let Some(confidence) = decision.confidence_override {
            unit.confidence = confidence.clamp(0.0, 1.0);
        }
        match tier {
            Tier::Working => {
                let ttl = self.policy.ttl_for_scope(unit.scope);
                self.store.working.put(unit.clone(), ttl);
            }
            Tier::Episodic => {
                self.store
                    .episodic
                    .append(&unit, EventType::for_kind(unit.kind))?;
            }
            Tier::Semantic => {
                let embedding = self.embedder.embed_one(&unit.content).await?;
                self.store.semantic.upsert(&unit, &embedding)?;
                // An existing record keeps its lifecycle and lower confidence.
                if let Some(record) = self.store.semantic.get(unit.id)? {
                    unit.lifecycle = record.unit.lifecycle;
                    unit.confidence = record.unit.confidence;
                }
                unit.embedding = Some(embedding);
            }
        }
        Ok(unit)
    }

    /// Deprecate `target` in the semantic tier on behalf of `candidate`.
    /// A target the semantic tier does not hold is reported as a warning.
    fn supersede(
        &self,
        target: MemoryId,
        candidate: &MemoryUnit,
        decision: &PolicyDecision,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let mut provenance = serde_json::Map::new();
        provenance.insert("deprecated_reason".into(), decision.reason.clone().into());
        provenance.insert("deprecated_by".into(), candidate.id.to_string().into());

        match self.store.semantic.deprecate_with_provenance(target, provenance) {
            Ok(()) => {
                info!(unit_id = %target, superseded_by = %candidate.id, "deprecated superseded unit");
                Ok(())
            }
            Err(MnemoError::NotFound { .. }) => {
                warn!(
                    unit_id = %target,
                    superseded_by = %candidate.id,
                    "deprecation target not in semantic tier"
                );
                warnings.push(format!(
                    "superseded unit {target} is not in the semantic tier; nothing deprecated"
                ));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ── Retrieval ──────────────────────────────────────────────

    /// Gather active working memory for the session, the globally most recent
    /// episodic events and, when `query` is given, the semantic units closest
    /// to it. An embedding failure fails the whole retrieval.
    pub async fn retrieve_context(
        &self,
        session_id: &str,
        query: Option<&str>,
    ) -> Result<RetrievedContext> {
        let mut working = self.store.working.get_active(session_id);
        working.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let episodic = self
            .store
            .episodic
            .recent(self.retrieval.episodic_limit)?
            .into_iter()
            .map(|e| e.unit)
            .collect();

        let semantic = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => self
                .search_by_text(q, self.retrieval.semantic_top_k, self.retrieval.min_confidence)
                .await?
                .into_iter()
                .map(|(unit, _)| unit)
                .collect(),
            None => Vec::new(),
        };

        Ok(RetrievedContext {
            working,
            episodic,
            semantic,
        })
    }

    /// See [`crate::context::compose`].
    pub fn compose(
        &self,
        session_id: &str,
        user_message: &str,
        context: RetrievedContext,
    ) -> ContextView {
        compose(
            session_id,
            user_message,
            context.working,
            context.episodic,
            context.semantic,
        )
    }

    pub fn get_stats(&self, session_id: &str) -> Result<MemoryStats> {
        Ok(MemoryStats {
            session_id: session_id.to_string(),
            working_count: self.store.working.get_active(session_id).len(),
            episodic_count: self.store.episodic.count_for_session(session_id)?,
            semantic_count_global: self.store.semantic.count()?,
            timestamp: Utc::now(),
        })
    }

    // ── Direct tier operations ─────────────────────────────────

    pub fn deprecate(&self, id: MemoryId) -> Result<()> {
        self.store.semantic.deprecate(id)
    }

    /// Returns the new confidence.
    pub fn reinforce(&self, id: MemoryId, boost: f64) -> Result<f64> {
        self.store.semantic.reinforce(id, boost)
    }

    pub fn search_semantic(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        min_confidence: f64,
    ) -> Result<Vec<(MemoryUnit, f32)>> {
        self.store
            .semantic
            .search(query_embedding, top_k, None, None, min_confidence)
    }

    /// Embed `query` and search the semantic tier with it.
    pub async fn search_by_text(
        &self,
        query: &str,
        top_k: usize,
        min_confidence: f64,
    ) -> Result<Vec<(MemoryUnit, f32)>> {
        let embedding = self.embedder.embed_one(query).await?;
        self.search_semantic(&embedding, top_k, min_confidence)
    }
}
