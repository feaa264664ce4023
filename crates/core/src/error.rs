//! Error types for the HackRx QA service.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, authentication, validation, collaborator
//! transport, upstream rate-limiting, document extraction, and serialization.

use thiserror::Error;

/// Unified error type for the HackRx QA service.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// `RateLimited` is deliberately separate from `Transport` and `Llm`:
/// the question orchestrator retries rate-limit signals with a backoff
/// delay and treats everything else as non-retryable.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or mismatched bearer credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Malformed or incomplete request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure reaching a collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream throttling signal (retryable with backoff)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// LLM provider errors other than rate limiting
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector index collaborator errors
    #[error("Vector index error: {0}")]
    Index(String),

    /// Document payload could not be parsed
    #[error("Document error: {0}")]
    Document(String),

    /// Document extraction encountered an unrecognized file type
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error is an upstream throttling signal the caller may
    /// retry after a delay.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
