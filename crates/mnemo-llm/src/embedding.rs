use std::sync::Arc;

use async_trait::async_trait;
use mnemo_config::EmbeddingConfig;
use mnemo_core::{MnemoError, Result};
use tracing::debug;

/// Dimensionality used by the hashing embedder when none is configured.
const DEFAULT_HASH_DIMS: usize = 384;

/// Trait for generating text embeddings. One provider must keep a fixed
/// dimensionality for the lifetime of a semantic index.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per text.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// The dimensionality of the output embeddings.
    fn dimensions(&self) -> usize;

    /// Provider name.
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MnemoError::Embedding(format!("{} returned no embedding", self.name())))
    }
}

/// Build the provider named in `[embedding]`, producing `dims`-sized vectors.
pub fn provider_from_config(
    config: &EmbeddingConfig,
    dims: usize,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config.api_key.clone().filter(|k| !k.is_empty()).ok_or_else(|| {
                MnemoError::Config(
                    "embedding.api_key is not set (set it in mnemo.toml or OPENAI_API_KEY)".into(),
                )
            })?;
            Ok(Arc::new(
                OpenAiEmbedding::new(api_key)
                    .with_model(config.model.clone(), dims)
                    .with_base_url(config.base_url.clone()),
            ))
        }
        "hash" => Ok(Arc::new(HashEmbedding::new(dims))),
        other => Err(MnemoError::Config(format!(
            "unknown embedding provider '{other}' (expected openai or hash)"
        ))),
    }
}

// ── OpenAI-compatible ──────────────────────────────────────────

/// OpenAI embeddings provider (text-embedding-3-small, text-embedding-3-large, or
/// any server speaking the same `/embeddings` API).
pub struct OpenAiEmbedding {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dims: usize,
}

impl OpenAiEmbedding {
    /// text-embedding-3-small at its native 1536 dimensions.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.openai.com/v1".into(),
            model: "text-embedding-3-small".into(),
            dims: 1536,
        }
    }

    /// Use a specific model. `dims` is requested from the API and checked on
    /// every response; 0 accepts whatever the model returns.
    pub fn with_model(mut self, model: String, dims: usize) -> Self {
        self.model = model;
        self.dims = dims;
        self
    }

    /// Use a custom base URL (Azure OpenAI, a local gateway, ...).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, texts: &[&str]) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": &self.model,
            "input": texts,
        });
        if self.dims > 0 {
            body["dimensions"] = self.dims.into();
        }
        body
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(model = %self.model, count = texts.len(), "generating embeddings");

        let resp = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(texts))
            .send()
            .await
            .map_err(|e| MnemoError::Embedding(format!("embedding request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(MnemoError::Embedding(format!("embedding HTTP {status}: {text}")));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MnemoError::Embedding(format!("embedding parse error: {e}")))?;

        let embeddings = parse_embedding_response(&data)?;
        if embeddings.len() != texts.len() {
            return Err(MnemoError::Embedding(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings
            .iter()
            .find(|e| self.dims > 0 && e.len() != self.dims)
        {
            return Err(MnemoError::Embedding(format!(
                "model returned {} dimensions, expected {}",
                bad.len(),
                self.dims
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Pull `data[*].embedding` out of an `/embeddings` response, in `index` order.
pub fn parse_embedding_response(data: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let items = data["data"]
        .as_array()
        .ok_or_else(|| MnemoError::Embedding("response has no data array".into()))?;

    let mut indexed: Vec<(u64, Vec<f32>)> = items
        .iter()
        .enumerate()
        .map(|(pos, item)| {
            let index = item["index"].as_u64().unwrap_or(pos as u64);
            let vector = item["embedding"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect()
                })
                .unwrap_or_default();
            (index, vector)
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

// ── Local hashing ──────────────────────────────────────────────

/// Offline bag-of-words embedder: each lowercased word is hashed into a
/// bucket and the vector is L2-normalised. Texts sharing words land close
/// together, which is all the router needs when no model is available.
#[derive(Debug, Clone)]
pub struct HashEmbedding {
    dims: usize,
}

impl HashEmbedding {
    pub fn new(dims: usize) -> Self {
        Self {
            dims: if dims == 0 { DEFAULT_HASH_DIMS } else { dims },
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for word in text.split_whitespace() {
            let word = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let bucket = (fnv1a(word.as_bytes()) % self.dims as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        } else {
            // Keep the vector usable for cosine ranking.
            vector[0] = 1.0;
        }
        vector
    }
}

/// FNV-1a, so vectors stored in an index stay valid across builds.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingProvider for HashEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash"
    }
}
