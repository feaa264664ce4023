//! Retrieval adapter.
//!
//! Turns a question into a context string: embed the question, fetch the
//! nearest chunks from the vector index, and join their texts.

use crate::embeddings::EmbeddingProvider;
use crate::store::VectorStore;
use hackrx_core::AppResult;
use std::sync::Arc;

/// Separator between chunk texts in the assembled context.
const CHUNK_SEPARATOR: &str = "\n\n";

/// Trait for context retrieval, the seam the orchestrator depends on.
///
/// Failures propagate to the caller; retry policy, if any, belongs there.
#[async_trait::async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Retrieve the context string for a question.
    ///
    /// Returns an empty string when the index has nothing relevant — no
    /// chunk found is not an error.
    async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<String>;
}

/// Production retriever backed by an embedding provider and a vector store.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    /// Create a retriever from its collaborators.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }
}

#[async_trait::async_trait]
impl ContextRetriever for Retriever {
    async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<String> {
        tracing::debug!("Retrieving top-{} chunks", top_k);

        let query_embedding = self.embedder.embed(question).await?;
        let chunks = self.store.query(&query_embedding, top_k).await?;

        if chunks.is_empty() {
            tracing::info!("No chunks retrieved for question");
            return Ok(String::new());
        }

        tracing::debug!(
            "Retrieved {} chunks (top score: {:.3})",
            chunks.len(),
            chunks.first().map(|c| c.score).unwrap_or(0.0)
        );

        Ok(chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR))
    }
}
