//! Build Client Options use case
//!
//! Resolves credentials, then merges every configuration source into the
//! final [`ClientOptions`] for a request. Options-only builds never touch
//! the network beyond the user key store.

use super::resolve_credentials::{CredentialError, ResolveCredentialsUseCase};
use crate::config::AppConfig;
use chatrelay_domain::{
    AnthropicConfig, ChatRequest, ClientOptions, ClientOptionsInput, anthropic_llm_config,
    build_client_options,
};
use tracing::debug;

/// Use case for building per-request client options
pub struct ClientOptionsUseCase {
    credentials: ResolveCredentialsUseCase,
}

impl ClientOptionsUseCase {
    pub fn new(credentials: ResolveCredentialsUseCase) -> Self {
        Self { credentials }
    }

    pub fn config(&self) -> &AppConfig {
        self.credentials.config()
    }

    /// Build options for `request`, optionally forcing a model.
    pub async fn build(
        &self,
        request: &ChatRequest,
        override_model: Option<&str>,
    ) -> Result<ClientOptions, CredentialError> {
        let resolution = self.credentials.execute(request).await?;
        let config = self.credentials.config();

        let options = build_client_options(&ClientOptionsInput {
            request,
            credentials: &resolution.credentials,
            user_values: resolution.user_values.as_ref(),
            endpoints: &config.endpoints,
            env: &config.env,
            override_model,
        })?;

        debug!(
            "Built client options for {} (model: {})",
            request.endpoint,
            options.model().unwrap_or("<none>")
        );
        Ok(options)
    }

    /// Build options and project them onto the Anthropic client config.
    pub async fn build_anthropic(
        &self,
        request: &ChatRequest,
        override_model: Option<&str>,
    ) -> Result<AnthropicConfig, CredentialError> {
        let options = self.build(request, override_model).await?;
        Ok(anthropic_llm_config(&options))
    }
}
