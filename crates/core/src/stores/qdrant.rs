use crate::error::ServiceError;
use crate::models::{CourseChunk, RetrievedSource, SourceMetadata};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.endpoint, self.collection)
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn ensure_collection(&self) -> Result<(), ServiceError> {
        let response = self.client.get(self.collection_url()).send().await?;

        if response.status() == StatusCode::OK {
            let parsed: Value = response.json().await?;
            let existing = parsed
                .pointer("/result/config/params/vectors/size")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;

            if existing != self.vector_size {
                return Err(ServiceError::DimensionMismatch {
                    expected: self.vector_size,
                    actual: existing,
                });
            }
            return Ok(());
        }

        if response.status() != StatusCode::NOT_FOUND {
            return Err(ServiceError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let response = self
            .client
            .put(self.collection_url())
            .json(&json!({
                "vectors": {
                    "size": self.vector_size,
                    "distance": "Cosine",
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn upsert_chunks(
        &self,
        chunks: &[CourseChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), ServiceError> {
        if chunks.len() != embeddings.len() {
            return Err(ServiceError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(embeddings.iter())
            .map(|(chunk, embedding)| {
                if embedding.len() != self.vector_size {
                    return Err(ServiceError::DimensionMismatch {
                        expected: self.vector_size,
                        actual: embedding.len(),
                    });
                }

                Ok(json!({
                    "id": Uuid::new_v4().to_string(),
                    "vector": embedding,
                    "payload": {
                        "text": chunk.text,
                        "source_file": chunk.source_file,
                        "source_path": chunk.source_path,
                        "page": chunk.page,
                        "chunk_index": chunk.chunk_index,
                    },
                }))
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedSource>, ServiceError> {
        if query_vector.len() != self.vector_size {
            return Err(ServiceError::DimensionMismatch {
                expected: self.vector_size,
                actual: query_vector.len(),
            });
        }

        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&json!({
                "vector": query_vector,
                "limit": top_k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let hits = parsed
            .pointer("/result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut result = Vec::new();
        for hit in hits {
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            let content = hit
                .pointer("/payload/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let source_file = hit
                .pointer("/payload/source_file")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let source_path = hit
                .pointer("/payload/source_path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let page = hit
                .pointer("/payload/page")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            let chunk_index = hit
                .pointer("/payload/chunk_index")
                .and_then(Value::as_u64)
                .unwrap_or(0);

            result.push(RetrievedSource {
                content,
                score,
                metadata: SourceMetadata {
                    source_file,
                    source_path,
                    page,
                    chunk_index,
                },
            });
        }

        Ok(result)
    }
}
