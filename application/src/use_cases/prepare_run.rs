//! Prepare Run use case
//!
//! Turns a request into the configuration handed to the agent runtime:
//! client options reduced to the run-level LLM config, plus the caller's
//! cancellation token.

use super::build_client_options::ClientOptionsUseCase;
use super::resolve_credentials::CredentialError;
use chatrelay_domain::{ChatRequest, RunLlmConfig, build_run_config};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Configuration for one agent run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub llm: RunLlmConfig,
    /// Passed through untouched.
    pub cancellation: Option<CancellationToken>,
}

impl RunConfig {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

pub struct PrepareRunUseCase {
    options: ClientOptionsUseCase,
    cancellation_token: Option<CancellationToken>,
}

impl PrepareRunUseCase {
    pub fn new(options: ClientOptionsUseCase) -> Self {
        Self {
            options,
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(
        &self,
        request: &ChatRequest,
        override_model: Option<&str>,
    ) -> Result<RunConfig, CredentialError> {
        let options = self.options.build(request, override_model).await?;
        let default_streaming = self.options.config().behavior.default_streaming;
        let llm = build_run_config(&request.endpoint, &options, default_streaming);

        debug!(
            "Prepared run for {} (streaming: {}, usage: {})",
            llm.provider, llm.streaming, llm.usage
        );
        Ok(RunConfig {
            llm,
            cancellation: self.cancellation_token.clone(),
        })
    }
}
