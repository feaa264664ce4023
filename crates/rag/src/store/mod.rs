//! Vector store abstraction.
//!
//! Defines a trait for the externally-hosted vector index collaborator:
//! upserting embedded chunks at ingestion time and answering nearest-neighbor
//! queries at question time.

pub mod pinecone;

pub use pinecone::PineconeStore;

use hackrx_core::AppResult;
use serde::{Deserialize, Serialize};

/// One embedded chunk ready for upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique id within the index
    pub id: String,

    /// Embedding vector
    pub values: Vec<f32>,

    /// Original chunk text, stored as metadata and read back at query time
    pub text: String,
}

/// One chunk returned by a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// Chunk text from the stored metadata
    pub text: String,

    /// Similarity score reported by the index
    pub score: f32,
}

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Insert or update embedded chunks in the index.
    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()>;

    /// Return the top-k chunks nearest to the query vector, ordered by
    /// descending similarity. An empty result is not an error.
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>>;
}
