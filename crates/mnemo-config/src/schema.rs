use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, maps to `mnemo.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MnemoConfig {
    pub memory: MemoryConfig,
    pub policy: PolicyConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub logging: LoggingConfig,
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Path to the SQLite database holding the episodic log and semantic index.
    pub db_path: PathBuf,
    /// Embedding dimensions of the semantic index (384 for MiniLM, 1536 for OpenAI, ...).
    /// 0 disables the dimensionality check.
    pub embedding_dims: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("mnemo.db"),
            embedding_dims: 384,
        }
    }
}

// ── Policy ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Working-memory TTL for session-scoped units.
    pub session_ttl_secs: u64,
    /// Working-memory TTL for project-scoped units.
    pub project_ttl_secs: u64,
    /// Working-memory TTL for global-scoped units.
    pub global_ttl_secs: u64,
    /// Lexical overlap above which a newer decision supersedes an older one.
    pub overlap_threshold: f64,
    /// Token budget above which working memory should be condensed.
    pub summarize_token_threshold: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            project_ttl_secs: 86_400,
            global_ttl_secs: 604_800,
            overlap_threshold: 0.7,
            summarize_token_threshold: 2000,
        }
    }
}

// ── Retrieval ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of most recent episodic events pulled into the context.
    pub episodic_limit: usize,
    /// Number of semantic hits pulled into the context.
    pub semantic_top_k: usize,
    /// Semantic hits below this confidence are ignored.
    pub min_confidence: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            episodic_limit: 10,
            semantic_top_k: 10,
            min_confidence: 0.5,
        }
    }
}

// ── Embedding ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "openai" (any OpenAI-compatible endpoint) or "hash" (deterministic, offline).
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// API key. Falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-3-small".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

const KNOWN_PROVIDERS: [&str; 2] = ["openai", "hash"];
const KNOWN_FORMATS: [&str; 2] = ["pretty", "json"];

impl MnemoConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all error messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Policy ───
        if !(0.0..=1.0).contains(&self.policy.overlap_threshold) {
            warnings.push(ConfigWarning {
                field: "policy.overlap_threshold".into(),
                message: format!("{} is out of range", self.policy.overlap_threshold),
                severity: WarningSeverity::Error,
                hint: Some("Overlap is a Jaccard index between 0.0 and 1.0".into()),
            });
        }
        for (field, ttl) in [
            ("policy.session_ttl_secs", self.policy.session_ttl_secs),
            ("policy.project_ttl_secs", self.policy.project_ttl_secs),
            ("policy.global_ttl_secs", self.policy.global_ttl_secs),
        ] {
            if ttl == 0 {
                warnings.push(ConfigWarning {
                    field: field.into(),
                    message: "TTL is 0; working memory entries would expire immediately".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }

        // ── Retrieval ───
        if !(0.0..=1.0).contains(&self.retrieval.min_confidence) {
            warnings.push(ConfigWarning {
                field: "retrieval.min_confidence".into(),
                message: format!("{} is out of range", self.retrieval.min_confidence),
                severity: WarningSeverity::Error,
                hint: Some("Confidence must be between 0.0 and 1.0".into()),
            });
        }
        if self.retrieval.semantic_top_k == 0 {
            warnings.push(ConfigWarning {
                field: "retrieval.semantic_top_k".into(),
                message: "top_k is 0; semantic search would never return anything".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 10".into()),
            });
        }

        // ── Embedding ───
        if self.memory.embedding_dims == 0 {
            warnings.push(ConfigWarning {
                field: "memory.embedding_dims".into(),
                message: "dimensionality check disabled".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to the output size of your embedding model".into()),
            });
        }
        if !KNOWN_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            warnings.push(ConfigWarning {
                field: "embedding.provider".into(),
                message: format!("unknown provider '{}'", self.embedding.provider),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", KNOWN_PROVIDERS.join(", "))),
            });
        }

        // ── Logging ───
        if !KNOWN_FORMATS.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown format '{}', falling back to pretty", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }
        Ok(warnings)
    }
}
