use crate::error::ServiceError;
use crate::models::{CourseChunk, RetrievedSource};
use async_trait::async_trait;
use std::sync::Arc;

/// Persists (vector, text, metadata) triples and answers nearest-neighbour
/// queries. Implementations are read-only after ingestion and safe to share
/// across requests.
#[async_trait]
pub trait VectorIndex {
    /// Create the backing collection if it does not exist, or verify its
    /// configured dimensionality if it does.
    async fn ensure_collection(&self) -> Result<(), ServiceError>;

    async fn upsert_chunks(
        &self,
        chunks: &[CourseChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), ServiceError>;

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedSource>, ServiceError>;
}

#[async_trait]
impl<T> VectorIndex for Arc<T>
where
    T: VectorIndex + Send + Sync,
{
    async fn ensure_collection(&self) -> Result<(), ServiceError> {
        (**self).ensure_collection().await
    }

    async fn upsert_chunks(
        &self,
        chunks: &[CourseChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), ServiceError> {
        (**self).upsert_chunks(chunks, embeddings).await
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedSource>, ServiceError> {
        (**self).search(query_vector, top_k).await
    }
}

/// A hosted language model that turns a filled prompt into answer text.
#[async_trait]
pub trait ChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}
