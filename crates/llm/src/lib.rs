//! LLM integration crate for the HackRx QA service.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models through a unified trait-based interface. Rate-limit
//! rejections from the upstream API are surfaced as a dedicated error variant
//! so the question orchestrator can retry them with backoff.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//!
//! # Example
//! ```no_run
//! use hackrx_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Is knee surgery covered?", "gemini-1.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::GeminiClient;
