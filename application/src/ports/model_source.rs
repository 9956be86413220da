//! Model source port
//!
//! Upstream HTTP collaborators: OpenAI-compatible `/models` listings and the
//! LiteLLM gateway's `/model/info` and `/guardrails/list`.

use async_trait::async_trait;
use chatrelay_domain::Guardrail;
use chatrelay_domain::catalog::ModelInfoResponse;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from an upstream fetch. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One `/models` listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchModelsRequest {
    pub endpoint_name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_id: String,
    /// `base_url` already points at the listing.
    pub direct: bool,
    /// Append `?user=<user_id>`.
    pub user_id_query: bool,
    pub headers: BTreeMap<String, String>,
}

#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Model ids from an OpenAI-style listing.
    async fn fetch_models(&self, request: &FetchModelsRequest) -> Result<Vec<String>, UpstreamError>;

    /// LiteLLM `GET {base_url}/model/info`.
    async fn fetch_model_info(
        &self,
        base_url: &str,
        authorization: Option<&str>,
    ) -> Result<ModelInfoResponse, UpstreamError>;

    /// LiteLLM `GET {base_url}/guardrails/list`.
    async fn fetch_guardrails(
        &self,
        base_url: &str,
        authorization: Option<&str>,
    ) -> Result<Vec<Guardrail>, UpstreamError>;
}
