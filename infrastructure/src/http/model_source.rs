//! reqwest-backed [`ModelSource`]
//!
//! Every request shares one client with a bounded timeout. Nothing is retried;
//! callers fall back to configured defaults instead.

use async_trait::async_trait;
use chatrelay_application::{FetchModelsRequest, ModelSource, UpstreamError};
use chatrelay_domain::Guardrail;
use chatrelay_domain::catalog::ModelInfoResponse;
use chatrelay_domain::core::string::join_url;
use chatrelay_domain::guardrails::GuardrailsResponse;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const OLLAMA: &str = "ollama";

/// OpenAI-style `GET /models` body
#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelListEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelListEntry {
    id: String,
}

/// Ollama `GET /api/tags` body
#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

fn upstream_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_decode() {
        UpstreamError::InvalidResponse(e.to_string())
    } else {
        UpstreamError::Network(e.to_string())
    }
}

fn trim_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

pub struct HttpModelSource {
    client: reqwest::Client,
}

impl HttpModelSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, UpstreamError> {
        let response = request.send().await.map_err(upstream_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.json::<T>().await.map_err(upstream_error)?;
        Ok(body)
    }

    fn models_url(request: &FetchModelsRequest) -> String {
        if request.endpoint_name == OLLAMA {
            let base = trim_slash(&request.base_url);
            let base = base.strip_suffix("/v1").unwrap_or(base);
            format!("{}/api/tags", base)
        } else if request.direct {
            request.base_url.clone()
        } else {
            join_url(&request.base_url, "models")
        }
    }
}

#[async_trait]
impl ModelSource for HttpModelSource {
    async fn fetch_models(&self, request: &FetchModelsRequest) -> Result<Vec<String>, UpstreamError> {
        let url = Self::models_url(request);
        debug!("Fetching models for {} from {}", request.endpoint_name, url);

        let mut builder = self.client.get(&url);
        let has_authorization = request
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        if let Some(key) = request.api_key.as_ref().filter(|_| !has_authorization) {
            builder = builder.bearer_auth(key);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.user_id_query {
            builder = builder.query(&[("user", request.user_id.as_str())]);
        }

        if request.endpoint_name == OLLAMA {
            let tags: OllamaTags = self.get_json(builder).await?;
            return Ok(tags.models.into_iter().map(|m| m.name).collect());
        }
        let list: ModelList = self.get_json(builder).await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn fetch_model_info(
        &self,
        base_url: &str,
        authorization: Option<&str>,
    ) -> Result<ModelInfoResponse, UpstreamError> {
        let mut builder = self.client.get(join_url(base_url, "model/info"));
        if let Some(auth) = authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        self.get_json(builder).await
    }

    async fn fetch_guardrails(
        &self,
        base_url: &str,
        authorization: Option<&str>,
    ) -> Result<Vec<Guardrail>, UpstreamError> {
        let mut builder = self
            .client
            .get(join_url(base_url, "guardrails/list"))
            .header(CONTENT_TYPE, "application/json");
        if let Some(auth) = authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        let response: GuardrailsResponse = self.get_json(builder).await?;
        Ok(response.guardrails)
    }
}
