use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("tracker state unreadable: {0}")]
    TrackerState(#[from] serde_json::Error),

    #[error("another ingestion run holds the lock: {0}")]
    LockHeld(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("embedding dimension {actual} does not match configured {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("request failed: {0}")]
    Request(String),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
