//! Deterministic collaborators for tests.
//!
//! Neither mock makes a network call. `MockEmbedding` wraps the hashing
//! embedder and can be switched into a failing mode; `MockExtractor` replays
//! queued results.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mnemo_core::{MemoryUnit, MnemoError, Result};
use parking_lot::Mutex;

use crate::embedding::{EmbeddingProvider, HashEmbedding};
use crate::extractor::{ConversationInput, ExtractionResult, Extractor};

/// Hash-based embedder that records its inputs and can be told to fail.
///
/// # Example
/// ```
/// use mnemo_llm::mock::MockEmbedding;
/// let embedder = MockEmbedding::new(16);
/// embedder.fail_with("quota exceeded");
/// ```
pub struct MockEmbedding {
    inner: HashEmbedding,
    failure: Mutex<Option<String>>,
    /// Every text passed to `embed`, in call order.
    pub texts: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedding {
    pub fn new(dims: usize) -> Self {
        Self {
            inner: HashEmbedding::new(dims),
            failure: Mutex::new(None),
            texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn texts_embedded(&self) -> usize {
        self.texts.lock().len()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(MnemoError::Embedding(message));
        }
        self.texts
            .lock()
            .extend(texts.iter().map(|t| t.to_string()));
        self.inner.embed(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A queued outcome for [`MockExtractor`].
#[derive(Debug, Clone)]
pub enum MockExtraction {
    Units(Vec<MemoryUnit>),
    /// Raw model output, run through the extraction parser.
    Raw(String),
    Error(String),
}

/// Extractor that replays queued outcomes in order, then returns nothing.
#[derive(Default)]
pub struct MockExtractor {
    queue: Mutex<VecDeque<MockExtraction>>,
    calls: AtomicUsize,
    /// Stamp replayed units with the input's session id.
    rebind_session: bool,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(self, units: Vec<MemoryUnit>) -> Self {
        self.queue.lock().push_back(MockExtraction::Units(units));
        self
    }

    pub fn with_raw(self, raw: &str) -> Self {
        self.queue.lock().push_back(MockExtraction::Raw(raw.to_string()));
        self
    }

    pub fn with_error(self, error: &str) -> Self {
        self.queue
            .lock()
            .push_back(MockExtraction::Error(error.to_string()));
        self
    }

    /// Replace `source_session` on replayed units with the input's session.
    pub fn rebinding_sessions(mut self) -> Self {
        self.rebind_session = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, input: &ConversationInput) -> Result<ExtractionResult> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let next = self.queue.lock().pop_front();
        let mut units = match next {
            None => Vec::new(),
            Some(MockExtraction::Units(units)) => units,
            Some(MockExtraction::Raw(raw)) => {
                crate::extractor::parse_extraction_response(&raw, &input.session_id)
            }
            Some(MockExtraction::Error(error)) => return Err(MnemoError::Extraction(error)),
        };
        if self.rebind_session {
            for unit in &mut units {
                unit.source_session = input.session_id.clone();
            }
        }
        let mut result = ExtractionResult::new(units);
        result.metadata.insert("model".into(), "mock".into());
        Ok(result)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
