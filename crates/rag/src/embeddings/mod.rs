//! Text embedding support.
//!
//! Defines the provider trait plus the Gemini REST implementation and a
//! deterministic mock for tests.

pub mod provider;
pub mod providers;

pub use provider::EmbeddingProvider;
pub use providers::{GeminiEmbedder, MockEmbedder};
