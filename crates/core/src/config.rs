use crate::chunking::validate_options;
use crate::error::IngestError;
use crate::models::ChunkingOptions;
use std::path::PathBuf;

/// Everything the assistant needs to talk to its collaborators, assembled
/// once at process start and validated before any of them is called.
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub data_dir: PathBuf,
    pub tracker_path: PathBuf,
    pub qdrant_url: String,
    pub collection: String,
    pub embedding_url: String,
    pub embedding_model: String,
    /// Must match the collection's configured vector size exactly; verified
    /// against the live collection at startup.
    pub embedding_dimensions: usize,
    pub chat_url: String,
    pub chat_api_key: Option<String>,
    pub chat_model: String,
    pub temperature: f32,
    pub top_k: usize,
    pub chunking: ChunkingOptions,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            tracker_path: PathBuf::from("ingested_files.json"),
            qdrant_url: "http://localhost:6333".to_string(),
            collection: "course_rag_vectors".to_string(),
            embedding_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimensions: 768,
            chat_url: "https://api.groq.com/openai".to_string(),
            chat_api_key: None,
            chat_model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            top_k: 3,
            chunking: ChunkingOptions::default(),
        }
    }
}

impl RagConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.embedding_dimensions == 0 {
            return Err(IngestError::InvalidArgument(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(IngestError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.collection.trim().is_empty() {
            return Err(IngestError::InvalidArgument(
                "collection name must not be empty".to_string(),
            ));
        }
        validate_options(&self.chunking)
    }
}

#[cfg(test)]
mod tests {
    use super::RagConfig;
    use crate::models::ChunkingOptions;

    #[test]
    fn defaults_validate() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dimensions_is_rejected() {
        let config = RagConfig {
            embedding_dimensions: 0,
            ..RagConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_overlap_is_rejected() {
        let config = RagConfig {
            chunking: ChunkingOptions {
                window_chars: 100,
                overlap_chars: 250,
            },
            ..RagConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
