//! Ingest command handler.
//!
//! One-shot pipeline: fetch a document from a URL, extract and chunk its
//! text, embed the chunks, and upsert them into the vector index.

use clap::Args;
use hackrx_core::{AppConfig, AppResult};
use hackrx_rag::Ingestor;

/// Fetch a document and load it into the vector index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// URL of the document to ingest (PDF, DOCX, or plain text)
    pub url: String,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate_collaborators()?;

        let (embedder, store) = super::build_index_collaborators(config)?;
        let ingestor = Ingestor::new(embedder, store);

        let summary = ingestor.ingest(&self.url).await?;

        println!(
            "Ingested {} chunks ({} bytes of text) into index '{}'",
            summary.chunks, summary.text_bytes, config.pinecone_index
        );

        Ok(())
    }
}
