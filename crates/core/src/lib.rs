//! HackRx QA Core Library
//!
//! This crate provides the foundational utilities for the HackRx QA service:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EngineConfig};
pub use error::{AppError, AppResult};
