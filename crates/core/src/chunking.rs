use crate::error::IngestError;
use crate::models::{ChunkingOptions, CourseChunk};
use sha2::{Digest, Sha256};

pub fn validate_options(options: &ChunkingOptions) -> Result<(), IngestError> {
    if options.window_chars == 0 {
        return Err(IngestError::InvalidChunkConfig(
            "window_chars must be greater than zero".to_string(),
        ));
    }
    if options.overlap_chars >= options.window_chars {
        return Err(IngestError::InvalidChunkConfig(format!(
            "overlap {} must be smaller than window {}",
            options.overlap_chars, options.window_chars
        )));
    }
    Ok(())
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into overlapping character windows. Boundaries depend only on
/// the input text and the options, so repeated runs over the same document
/// produce identical chunks.
pub fn split_text(text: &str, options: &ChunkingOptions) -> Result<Vec<String>, IngestError> {
    validate_options(options)?;

    let chars: Vec<char> = text.chars().collect();
    let step = options.window_chars - options.overlap_chars;

    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let end = (start + options.window_chars).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            pieces.push(piece);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(pieces)
}

/// Chunks one page of a document, threading a per-file chunk index through
/// so chunk numbering stays monotonic across pages.
pub fn chunk_page(
    source_file: &str,
    source_path: &str,
    page: u32,
    page_text: &str,
    options: &ChunkingOptions,
    start_index: u64,
) -> Result<(Vec<CourseChunk>, u64), IngestError> {
    let normalized = normalize_whitespace(page_text);

    let mut chunks = Vec::new();
    let mut cursor = start_index;

    for piece in split_text(&normalized, options)? {
        let chunk_id = make_chunk_id(source_path, page, cursor, &piece);
        chunks.push(CourseChunk {
            chunk_id,
            source_file: source_file.to_string(),
            source_path: source_path.to_string(),
            page,
            chunk_index: cursor,
            text: piece,
        });
        cursor = cursor.saturating_add(1);
    }

    Ok((chunks, cursor))
}

fn make_chunk_id(source_path: &str, page: u32, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_path.as_bytes());
    hasher.update(page.to_le_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
