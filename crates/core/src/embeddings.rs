use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Maps text to fixed-length vectors.
///
/// The vector index's collection must be configured with exactly
/// `dimensions()`; that agreement is verified at startup rather than
/// assumed.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let input = vec![text.to_string()];
        let mut vectors = self.embed_batch(&input).await?;
        vectors
            .pop()
            .ok_or_else(|| ServiceError::Request("embedding service returned no vector".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for an Ollama-style embedding endpoint
/// (`POST {base}/api/embed` with a model name and a batch of inputs).
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    dimensions: usize,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/api/embed", self.endpoint))
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "embedding".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: EmbedResponse = response.json().await?;

        if parsed.embeddings.len() != texts.len() {
            return Err(ServiceError::Request(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        for vector in &parsed.embeddings {
            if vector.len() != self.dimensions {
                return Err(ServiceError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
        }

        Ok(parsed.embeddings)
    }
}
