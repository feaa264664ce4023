//! Retrieval-augmented question answering over an ingested document.
//!
//! Two halves:
//! - Ingestion: fetch a document, extract text, chunk, embed, upsert into
//!   the vector index ([`ingest`]).
//! - Serving: answer batches of questions by retrieving context and
//!   completing against the LLM ([`engine`]).

pub mod chunker;
pub mod document;
pub mod embeddings;
pub mod engine;
pub mod ingest;
pub mod retriever;
pub mod store;

pub use engine::{EngineSettings, QaEngine, BUSY_FALLBACK, ERROR_FALLBACK};
pub use ingest::{IngestSummary, Ingestor};
pub use retriever::{ContextRetriever, Retriever};
