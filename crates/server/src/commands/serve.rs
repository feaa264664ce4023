//! Serve command handler.
//!
//! Wires the collaborators together and runs the HTTP server until the
//! process is stopped.

use crate::http;
use clap::Args;
use hackrx_core::{AppConfig, AppError, AppResult};
use hackrx_llm::create_client;
use hackrx_rag::{EngineSettings, QaEngine, Retriever};
use std::sync::Arc;

/// Run the HTTP question-answering server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Host interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate_collaborators()?;

        // Serving requires the inbound bearer-token secret
        let team_token = config
            .team_token
            .clone()
            .ok_or_else(|| AppError::Config("HACKRX_TEAM_TOKEN is not set".to_string()))?;

        let (embedder, store) = super::build_index_collaborators(config)?;
        let retriever = Arc::new(Retriever::new(embedder, store));

        let gemini_api_key = config
            .gemini_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY is not set".to_string()))?;
        let llm = create_client("gemini", None, Some(gemini_api_key))
            .map_err(AppError::Config)?;

        let settings = EngineSettings::from_config(&config.engine, &config.model);
        tracing::info!(
            "Engine: concurrency={}, top_k={}, max_attempts={}, model={}",
            settings.concurrency,
            settings.top_k,
            settings.max_attempts,
            settings.model
        );

        let engine = Arc::new(QaEngine::new(retriever, llm, settings)?);

        http::serve(&config.host, config.port, engine, team_token).await
    }
}
