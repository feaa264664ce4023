//! Command handlers for the hackrx binary.

pub mod ingest;
pub mod serve;

// Re-export command types for convenience
pub use ingest::IngestCommand;
pub use serve::ServeCommand;

use hackrx_core::{AppConfig, AppError, AppResult};
use hackrx_rag::embeddings::{EmbeddingProvider, GeminiEmbedder};
use hackrx_rag::store::{PineconeStore, VectorStore};
use std::sync::Arc;

/// Build the embedding and vector-index collaborators from configuration.
///
/// Call after `validate_collaborators`; missing credentials still surface as
/// config errors rather than panics.
fn build_index_collaborators(
    config: &AppConfig,
) -> AppResult<(Arc<dyn EmbeddingProvider>, Arc<dyn VectorStore>)> {
    let gemini_api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| AppError::Config("GEMINI_API_KEY is not set".to_string()))?;

    let pinecone_api_key = config
        .pinecone_api_key
        .as_deref()
        .ok_or_else(|| AppError::Config("PINECONE_API_KEY is not set".to_string()))?;

    let index_host = config
        .pinecone_index_host
        .as_deref()
        .ok_or_else(|| AppError::Config("PINECONE_INDEX_HOST is not set".to_string()))?;

    let embedder = Arc::new(GeminiEmbedder::new(gemini_api_key, &config.embedding_model));
    let store = Arc::new(PineconeStore::new(index_host, pinecone_api_key));

    Ok((embedder, store))
}
