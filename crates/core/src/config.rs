//! Configuration management for the HackRx QA service.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - An optional YAML config file
//!
//! Environment variables take precedence over the YAML file; CLI flags take
//! precedence over both.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Main application configuration.
///
/// This struct holds everything the service needs at startup: collaborator
/// credentials, the bearer-token secret for inbound requests, the HTTP bind
/// address, and the orchestrator tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Bearer-token secret for the /api/v1/hackrx/run endpoint
    pub team_token: Option<String>,

    /// API key for the Gemini LLM and embedding collaborators
    pub gemini_api_key: Option<String>,

    /// API key for the Pinecone vector index collaborator
    pub pinecone_api_key: Option<String>,

    /// Host of the Pinecone index (e.g. "my-index-abc123.svc.pinecone.io")
    pub pinecone_index_host: Option<String>,

    /// Name of the Pinecone index
    pub pinecone_index: String,

    /// Host interface for the HTTP server
    pub host: String,

    /// Port for the HTTP server
    pub port: u16,

    /// LLM model identifier
    pub model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Orchestrator tunables
    pub engine: EngineConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Tunables for the concurrent question orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of questions processed simultaneously
    pub concurrency: usize,

    /// Number of nearest-neighbor chunks retrieved per question
    pub top_k: usize,

    /// Total attempts per question when the upstream signals a rate limit
    pub max_attempts: u32,

    /// Fixed delay between rate-limit retries, in seconds
    pub retry_delay_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            top_k: 3,
            max_attempts: 3,
            retry_delay_secs: 15,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerConfig>,
    engine: Option<EngineFileConfig>,
    logging: Option<LoggingConfig>,
    model: Option<String>,
    embedding_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineFileConfig {
    concurrency: Option<usize>,
    top_k: Option<usize>,
    max_attempts: Option<u32>,
    retry_delay_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            team_token: None,
            gemini_api_key: None,
            pinecone_api_key: None,
            pinecone_index_host: None,
            pinecone_index: "policy-index".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: "gemini-1.5-flash".to_string(),
            embedding_model: "models/embedding-001".to_string(),
            engine: EngineConfig::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `HACKRX_TEAM_TOKEN`: Bearer-token secret for inbound requests
    /// - `GEMINI_API_KEY`: Gemini API key (LLM + embeddings)
    /// - `PINECONE_API_KEY`: Pinecone API key
    /// - `PINECONE_INDEX_HOST`: Pinecone index host
    /// - `PINECONE_INDEX`: Pinecone index name
    /// - `HACKRX_HOST` / `HACKRX_PORT`: HTTP bind address
    /// - `HACKRX_CONFIG`: Path to a YAML config file
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with_file(None)
    }

    /// Load configuration with an explicit config file path.
    ///
    /// A path given here (e.g. from a CLI flag) wins over `HACKRX_CONFIG`.
    pub fn load_with_file(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.config_file = config_file.or_else(|| {
            std::env::var("HACKRX_CONFIG").ok().map(PathBuf::from)
        });

        // Load from YAML config file if it exists
        if let Some(path) = config.config_file.clone() {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        config.team_token = std::env::var("HACKRX_TEAM_TOKEN").ok().or(config.team_token);
        config.gemini_api_key = std::env::var("GEMINI_API_KEY").ok().or(config.gemini_api_key);
        config.pinecone_api_key = std::env::var("PINECONE_API_KEY")
            .ok()
            .or(config.pinecone_api_key);
        config.pinecone_index_host = std::env::var("PINECONE_INDEX_HOST")
            .ok()
            .or(config.pinecone_index_host);

        if let Ok(index) = std::env::var("PINECONE_INDEX") {
            config.pinecone_index = index;
        }

        if let Ok(host) = std::env::var("HACKRX_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("HACKRX_PORT") {
            config.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid HACKRX_PORT: {}", port)))?;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(server) = config_file.server {
            if let Some(host) = server.host {
                result.host = host;
            }
            if let Some(port) = server.port {
                result.port = port;
            }
        }

        if let Some(engine) = config_file.engine {
            if let Some(concurrency) = engine.concurrency {
                result.engine.concurrency = concurrency;
            }
            if let Some(top_k) = engine.top_k {
                result.engine.top_k = top_k;
            }
            if let Some(max_attempts) = engine.max_attempts {
                result.engine.max_attempts = max_attempts;
            }
            if let Some(retry_delay_secs) = engine.retry_delay_secs {
                result.engine.retry_delay_secs = retry_delay_secs;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(model) = config_file.model {
            result.model = model;
        }

        if let Some(embedding_model) = config_file.embedding_model {
            result.embedding_model = embedding_model;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }

        if let Some(port) = port {
            self.port = port;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate that collaborator credentials are present.
    ///
    /// The serve path additionally requires `team_token`; that check lives
    /// with the server so `ingest` can run without it.
    pub fn validate_collaborators(&self) -> AppResult<()> {
        if self.gemini_api_key.is_none() {
            return Err(AppError::Config(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        if self.pinecone_api_key.is_none() {
            return Err(AppError::Config(
                "PINECONE_API_KEY is not set".to_string(),
            ));
        }

        if self.pinecone_index_host.is_none() {
            return Err(AppError::Config(
                "PINECONE_INDEX_HOST is not set".to_string(),
            ));
        }

        if self.engine.concurrency == 0 {
            return Err(AppError::Config(
                "engine.concurrency must be at least 1".to_string(),
            ));
        }

        if self.engine.max_attempts == 0 {
            return Err(AppError::Config(
                "engine.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.engine.concurrency, 2);
        assert_eq!(config.engine.top_k, 3);
        assert_eq!(config.engine.max_attempts, 3);
        assert_eq!(config.engine.retry_delay_secs, 15);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden =
            config.with_overrides(Some("127.0.0.1".to_string()), Some(9000), None, true, false);

        assert_eq!(overridden.host, "127.0.0.1");
        assert_eq!(overridden.port, 9000);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_missing_credentials() {
        let config = AppConfig::default();
        assert!(config.validate_collaborators().is_err());
    }

    #[test]
    fn test_validate_complete() {
        let mut config = AppConfig::default();
        config.gemini_api_key = Some("key".to_string());
        config.pinecone_api_key = Some("key".to_string());
        config.pinecone_index_host = Some("index.svc.pinecone.io".to_string());
        assert!(config.validate_collaborators().is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = AppConfig::default();
        config.gemini_api_key = Some("key".to_string());
        config.pinecone_api_key = Some("key".to_string());
        config.pinecone_index_host = Some("index.svc.pinecone.io".to_string());
        config.engine.concurrency = 0;
        assert!(config.validate_collaborators().is_err());
    }
}
