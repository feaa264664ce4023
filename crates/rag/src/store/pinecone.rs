//! Pinecone vector index client.
//!
//! Talks to a hosted Pinecone index over its data-plane REST API:
//! `POST /vectors/upsert` and `POST /query` with metadata included so the
//! chunk text comes back with each match.

use crate::store::{RetrievedChunk, VectorRecord, VectorStore};
use hackrx_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Upsert batch size; Pinecone recommends keeping batches modest.
const UPSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Serialize)]
struct UpsertRequest {
    vectors: Vec<PineconeVector>,
}

#[derive(Debug, Serialize)]
struct PineconeVector {
    id: String,
    values: Vec<f32>,
    metadata: ChunkMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChunkMetadata {
    text: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    metadata: Option<ChunkMetadata>,
}

/// Pinecone data-plane client for one index.
#[derive(Debug)]
pub struct PineconeStore {
    /// Index base URL, e.g. "https://my-index-abc123.svc.pinecone.io"
    base_url: String,

    /// API key
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl PineconeStore {
    /// Create a client for an index host.
    ///
    /// The host may be given with or without a scheme.
    pub fn new(index_host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let host = index_host.into();
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };

        Self {
            base_url,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::Transport(format!("Failed to reach vector index: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RateLimited(format!(
                "Vector index throttled the request: {}",
                error_text
            )));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Vector index error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(&self, records: &[VectorRecord]) -> AppResult<()> {
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|record| PineconeVector {
                        id: record.id.clone(),
                        values: record.values.clone(),
                        metadata: ChunkMetadata {
                            text: record.text.clone(),
                        },
                    })
                    .collect(),
            };

            self.post_json("/vectors/upsert", &request).await?;
            tracing::debug!("Upserted batch of {} vectors", batch.len());
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            include_metadata: true,
        };

        let response = self.post_json("/query", &request).await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse query response: {}", e)))?;

        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|metadata| RetrievedChunk {
                    text: metadata.text,
                    score: m.score,
                })
            })
            .collect())
    }
}
