//! # mnemo-llm
//!
//! Seams to the model-backed collaborators of the memory router: text
//! embedding and memory extraction. Ships an OpenAI-compatible embedding
//! client, an offline hashing embedder, the extraction response parser and
//! deterministic mocks for tests.

pub mod embedding;
pub mod extractor;
pub mod mock;

pub use embedding::{EmbeddingProvider, HashEmbedding, OpenAiEmbedding, provider_from_config};
pub use extractor::{
    ConversationInput, ConversationTurn, ExtractionResult, Extractor, parse_extraction_response,
};
