//! Extraction seam: turns raw conversation into candidate memory units.
//!
//! The model call itself lives outside this workspace. What lives here is the
//! input/output shape, the [`Extractor`] trait the router drives, and the
//! parser that recovers candidates from a model's JSON answer.

use async_trait::async_trait;
use mnemo_core::{DEFAULT_CONFIDENCE, MemoryKind, MemoryScope, MemoryUnit, Result, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One prior message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default = "default_role")]
    pub role: String,
    pub content: String,
}

fn default_role() -> String {
    "user".into()
}

/// What the router hands to an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInput {
    pub session_id: SessionId,
    pub user_message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
}

impl ConversationInput {
    pub fn new(session_id: impl Into<SessionId>, user_message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_message: user_message.into(),
            conversation_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }
}

/// Candidates plus free-form metadata about the extraction run
/// (model, token usage, or an `error` entry when extraction failed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub units: Vec<MemoryUnit>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ExtractionResult {
    pub fn new(units: Vec<MemoryUnit>) -> Self {
        Self {
            units,
            metadata: serde_json::Map::new(),
        }
    }

    /// An empty result annotated with the failure.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("error".into(), error.to_string().into());
        Self {
            units: Vec::new(),
            metadata,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.metadata.get("error").and_then(|v| v.as_str())
    }
}

/// Turns a conversation into candidate memory units.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, input: &ConversationInput) -> Result<ExtractionResult>;

    fn name(&self) -> &str;
}

/// One artifact as a model emits it, before validation.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(rename = "type")]
    kind: String,
    content: String,
    scope: String,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
}

impl RawArtifact {
    fn into_unit(self, session_id: &str) -> std::result::Result<MemoryUnit, String> {
        let kind: MemoryKind = self.kind.parse()?;
        let scope: MemoryScope = self.scope.parse()?;
        let confidence = match self.confidence {
            None | Some(serde_json::Value::Null) => DEFAULT_CONFIDENCE,
            Some(serde_json::Value::Number(n)) => {
                n.as_f64().ok_or_else(|| format!("confidence {n} is not a float"))?
            }
            Some(serde_json::Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| format!("confidence '{s}' is not a number"))?,
            Some(other) => return Err(format!("confidence {other} is not a number")),
        };
        let unit = MemoryUnit::new(kind, self.content, scope, session_id).with_confidence(confidence);
        unit.validate().map_err(|e| e.to_string())?;
        Ok(unit)
    }
}

/// Recover candidates from a model's answer.
///
/// Takes the outermost `[ ... ]` span of the text, so prose or code fences
/// around the array are ignored. Artifacts with an unknown type or scope, a
/// bad confidence or empty content are skipped. Unparsable JSON yields no
/// candidates.
pub fn parse_extraction_response(raw: &str, session_id: &str) -> Vec<MemoryUnit> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        debug!("extraction response contains no JSON array");
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let artifacts: Vec<serde_json::Value> = match serde_json::from_str(&raw[start..=end]) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            warn!(error = %e, "failed to parse extraction JSON; returning no candidates");
            return Vec::new();
        }
    };

    artifacts
        .into_iter()
        .filter_map(|value| {
            let parsed = serde_json::from_value::<RawArtifact>(value)
                .map_err(|e| e.to_string())
                .and_then(|raw| raw.into_unit(session_id));
            match parsed {
                Ok(unit) => Some(unit),
                Err(reason) => {
                    warn!(%reason, "skipping malformed extraction artifact");
                    None
                }
            }
        })
        .collect()
}
