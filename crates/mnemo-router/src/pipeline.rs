//! The end-to-end unit of work: extract, route, retrieve, compose.

use mnemo_core::{MemoryUnit, PolicyDecision, Result};
use mnemo_llm::{ConversationInput, ExtractionResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::{ContextView, RetrievedContext};
use crate::router::{MemoryRouter, Rejection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Route and store extracted candidates.
    pub apply_policies: bool,
    /// Pull cross-tier context into the composed view.
    pub retrieve_context: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            apply_policies: true,
            retrieve_context: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub context: ContextView,
    pub stored: Vec<MemoryUnit>,
    pub decisions: Vec<PolicyDecision>,
    pub rejected: Vec<Rejection>,
    pub warnings: Vec<String>,
    /// Extraction metadata plus run totals; `extraction_error` is set when
    /// extraction failed.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ProcessOutcome {
    pub fn extraction_error(&self) -> Option<&str> {
        self.metadata.get("extraction_error").and_then(|v| v.as_str())
    }
}

impl MemoryRouter {
    /// Run one conversation turn through the whole pipeline.
    ///
    /// Extraction is fail-soft: a failing or missing extractor yields no
    /// candidates and an `extraction_error` annotation. Storage and embedding
    /// failures during retrieval are returned as errors.
    pub async fn process_conversation(
        &self,
        input: &ConversationInput,
        options: ProcessOptions,
    ) -> Result<ProcessOutcome> {
        let extraction = self.run_extraction(input).await;
        let extracted = extraction.units.len();

        let mut metadata = serde_json::Map::new();
        if let Some(error) = extraction.error() {
            metadata.insert("extraction_error".into(), error.into());
        }
        metadata.insert(
            "extraction".into(),
            serde_json::Value::Object(extraction.metadata.clone()),
        );

        let routed = if options.apply_policies && !extraction.units.is_empty() {
            self.route_and_store(&input.session_id, extraction.units)
                .await?
        } else {
            Default::default()
        };

        let retrieved = if options.retrieve_context {
            let query = Some(input.user_message.as_str());
            self.retrieve_context(&input.session_id, query).await?
        } else {
            RetrievedContext::default()
        };
        let context = self.compose(&input.session_id, &input.user_message, retrieved);

        metadata.insert("total_memories_stored".into(), routed.stored.len().into());
        metadata.insert("needs_summary".into(), routed.needs_summary.into());
        metadata.insert(
            "memory_breakdown".into(),
            serde_json::to_value(context.summary.memory_breakdown)?,
        );

        info!(
            session_id = %input.session_id,
            extracted,
            stored = routed.stored.len(),
            rejected = routed.rejected.len(),
            total_memories = context.summary.total_memories,
            "processed conversation"
        );

        Ok(ProcessOutcome {
            context,
            stored: routed.stored,
            decisions: routed.decisions,
            rejected: routed.rejected,
            warnings: routed.warnings,
            metadata,
        })
    }

    async fn run_extraction(&self, input: &ConversationInput) -> ExtractionResult {
        let Some(extractor) = self.extractor() else {
            return ExtractionResult::failed("no extractor configured");
        };
        match extractor.extract(input).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    session_id = %input.session_id,
                    extractor = extractor.name(),
                    error = %e,
                    "extraction failed"
                );
                ExtractionResult::failed(e)
            }
        }
    }
}
