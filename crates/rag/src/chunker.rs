//! Overlapping text chunking for document ingestion.
//!
//! Splits extracted document text into bounded chunks with bounded overlap
//! between neighbors, using the text-splitter crate for boundary-aware
//! splitting.

use hackrx_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Maximum chunk length in characters.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between neighboring chunks in characters.
pub const CHUNK_OVERLAP: usize = 200;

/// Split text into overlapping chunks.
///
/// Empty or whitespace-only chunks are dropped. An empty input yields an
/// empty chunk list, not an error.
pub fn chunk_text(text: &str) -> AppResult<Vec<String>> {
    chunk_text_with(text, CHUNK_SIZE, CHUNK_OVERLAP)
}

/// Split text with explicit size and overlap.
pub fn chunk_text_with(text: &str, chunk_size: usize, overlap: usize) -> AppResult<Vec<String>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk config: {}", e)))?;

    let splitter = TextSplitter::new(config);

    let chunks: Vec<String> = splitter
        .chunks(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| chunk.to_string())
        .collect();

    tracing::debug!(
        "Split {} bytes of text into {} chunks",
        text.len(),
        chunks.len()
    );

    Ok(chunks)
}
