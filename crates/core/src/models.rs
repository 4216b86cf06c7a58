use serde::{Deserialize, Serialize};

/// One embedded-and-indexed slice of a course document. The text is a
/// fixed-size window over a single page; neighbouring windows overlap so
/// retrieval keeps local context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseChunk {
    pub chunk_id: String,
    pub source_file: String,
    pub source_path: String,
    pub page: u32,
    pub chunk_index: u64,
    pub text: String,
}

/// Metadata stored alongside each chunk in the index and echoed back with
/// every retrieved source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source_file: String,
    pub source_path: String,
    pub page: u32,
    pub chunk_index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSource {
    pub content: String,
    pub score: f64,
    pub metadata: SourceMetadata,
}

/// Answer plus the raw retrieved chunks it was grounded in.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<RetrievedSource>,
}

/// Chunking policy: window size and overlap in characters. The defaults are
/// the values the assistant was tuned with; change both sides together or
/// retrieval quality drifts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub window_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            window_chars: 1_000,
            overlap_chars: 100,
        }
    }
}
