pub mod assistant;
pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod stores;
pub mod tracker;
pub mod traits;

pub use assistant::CourseAssistant;
pub use chunking::{chunk_page, normalize_whitespace, split_text};
pub use config::RagConfig;
pub use embeddings::{Embedder, OllamaEmbedder};
pub use error::{IngestError, ServiceError};
pub use extractor::{LopdfExtractor, PageText, PdfExtractor};
pub use ingest::{discover_pdf_files, IngestPipeline, IngestionReport, SkippedFile};
pub use llm::GroqChatModel;
pub use models::{ChunkingOptions, CourseChunk, RagAnswer, RetrievedSource, SourceMetadata};
pub use prompt::{build_prompt, format_context, CONTEXT_SEPARATOR, FALLBACK_ANSWER};
pub use stores::QdrantStore;
pub use tracker::{IngestLock, TrackedFiles};
pub use traits::{ChatModel, VectorIndex};
