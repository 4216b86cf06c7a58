mod server;

use chrono::Utc;
use clap::{Parser, Subcommand};
use course_rag_core::{
    ChunkingOptions, IngestLock, IngestPipeline, LopdfExtractor, OllamaEmbedder, QdrantStore,
    RagConfig, TrackedFiles, VectorIndex,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "course-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection holding the course chunks
    #[arg(long, env = "QDRANT_COLLECTION", default_value = "course_rag_vectors")]
    collection: String,

    /// Embedding service base URL
    #[arg(long, env = "EMBEDDING_URL", default_value = "http://localhost:11434")]
    embedding_url: String,

    /// Embedding model name
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "nomic-embed-text")]
    embedding_model: String,

    /// Embedding dimensionality; must match the collection's vector size
    #[arg(long, env = "EMBEDDING_DIMENSIONS", default_value = "768")]
    embedding_dimensions: usize,

    /// Chat completions base URL (OpenAI-compatible)
    #[arg(long, env = "GROQ_BASE_URL", default_value = "https://api.groq.com/openai")]
    chat_url: String,

    /// API key for the chat service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    chat_api_key: Option<String>,

    /// Chat model used to generate answers
    #[arg(long, env = "GROQ_MODEL", default_value = "llama-3.3-70b-versatile")]
    chat_model: String,

    /// Sampling temperature for answer generation
    #[arg(long, default_value = "0.2")]
    temperature: f32,

    /// Number of chunks retrieved per question
    #[arg(long, default_value = "3")]
    top_k: usize,

    /// Chunk window size in characters
    #[arg(long, default_value = "1000")]
    chunk_size: usize,

    /// Overlap between neighbouring chunks in characters
    #[arg(long, default_value = "100")]
    chunk_overlap: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest new course PDFs and index their chunks.
    Ingest {
        /// Folder containing course PDFs, searched recursively.
        #[arg(long, default_value = "Data")]
        folder: PathBuf,

        /// JSON snapshot of file names that finished ingestion.
        #[arg(long, default_value = "ingested_files.json")]
        tracker: PathBuf,
    },
    /// Serve the question-answering HTTP endpoint.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = RagConfig {
        qdrant_url: cli.qdrant_url,
        collection: cli.collection,
        embedding_url: cli.embedding_url,
        embedding_model: cli.embedding_model,
        embedding_dimensions: cli.embedding_dimensions,
        chat_url: cli.chat_url,
        chat_api_key: cli.chat_api_key,
        chat_model: cli.chat_model,
        temperature: cli.temperature,
        top_k: cli.top_k,
        chunking: ChunkingOptions {
            window_chars: cli.chunk_size,
            overlap_chars: cli.chunk_overlap,
        },
        ..RagConfig::default()
    };
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "course-rag boot"
    );

    match cli.command {
        Command::Ingest { folder, tracker } => {
            config.data_dir = folder;
            config.tracker_path = tracker;
            run_ingest(&config).await
        }
        Command::Serve { bind } => server::serve(config, &bind).await,
    }
}

async fn run_ingest(config: &RagConfig) -> anyhow::Result<()> {
    let _lock = IngestLock::acquire(&config.tracker_path)?;
    let mut tracked = TrackedFiles::load(&config.tracker_path)?;

    let embedder = OllamaEmbedder::new(
        &config.embedding_url,
        &config.embedding_model,
        config.embedding_dimensions,
    );
    let store = QdrantStore::new(
        &config.qdrant_url,
        &config.collection,
        config.embedding_dimensions,
    );
    store.ensure_collection().await?;

    let pipeline = IngestPipeline::new(LopdfExtractor, embedder, store, config.chunking);
    let report = pipeline.run(&config.data_dir, &mut tracked).await?;

    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped file");
    }

    tracked.persist(&config.tracker_path)?;

    info!(
        new_files = report.new_files.len(),
        chunks = report.chunks_indexed,
        tracked_total = tracked.len(),
        "ingestion run complete"
    );
    println!(
        "{} new files, {} chunks indexed at {}",
        report.new_files.len(),
        report.chunks_indexed,
        Utc::now().to_rfc3339()
    );

    Ok(())
}
