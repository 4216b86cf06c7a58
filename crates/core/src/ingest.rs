use crate::chunking::chunk_page;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::extractor::PdfExtractor;
use crate::models::ChunkingOptions;
use crate::tracker::TrackedFiles;
use crate::traits::VectorIndex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub new_files: Vec<String>,
    pub chunks_indexed: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Runs incremental ingestion: extract, chunk, embed, and index every
/// discovered PDF the tracker has not seen, one file at a time.
///
/// A file is marked in the tracker strictly after its chunks are in the
/// index. Files that fail to extract or index are reported as skipped and
/// stay unmarked, so the next run retries them.
pub struct IngestPipeline<X, E, V> {
    extractor: X,
    embedder: E,
    index: V,
    options: ChunkingOptions,
}

impl<X, E, V> IngestPipeline<X, E, V>
where
    X: PdfExtractor + Send + Sync,
    E: Embedder,
    V: VectorIndex + Send + Sync,
{
    pub fn new(extractor: X, embedder: E, index: V, options: ChunkingOptions) -> Self {
        Self {
            extractor,
            embedder,
            index,
            options,
        }
    }

    pub async fn run(
        &self,
        folder: &Path,
        tracker: &mut TrackedFiles,
    ) -> Result<IngestionReport, IngestError> {
        if !folder.is_dir() {
            return Err(IngestError::InvalidArgument(format!(
                "data folder not found: {}",
                folder.display()
            )));
        }

        let mut report = IngestionReport {
            new_files: Vec::new(),
            chunks_indexed: 0,
            skipped: Vec::new(),
        };

        for path in discover_pdf_files(folder) {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;

            if !tracker.is_new(file_name) {
                continue;
            }

            match self.ingest_file(&path, file_name).await {
                Ok(chunk_count) => {
                    tracker.mark_ingested(file_name);
                    report.new_files.push(file_name.to_string());
                    report.chunks_indexed += chunk_count;
                }
                Err(error) => {
                    let reason = error.to_string();
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
        }

        Ok(report)
    }

    async fn ingest_file(&self, path: &Path, file_name: &str) -> Result<usize, IngestError> {
        let source_path = path.to_string_lossy().to_string();
        let pages = self.extractor.extract_pages(path)?;

        let mut chunks = Vec::new();
        let mut cursor = 0u64;
        for page in pages {
            let (page_chunks, next_cursor) = chunk_page(
                file_name,
                &source_path,
                page.number,
                &page.text,
                &self.options,
                cursor,
            )?;
            cursor = next_cursor;
            chunks.extend(page_chunks);
        }

        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        self.index.upsert_chunks(&chunks, &embeddings).await?;

        Ok(chunks.len())
    }
}
