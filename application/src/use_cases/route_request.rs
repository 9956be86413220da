//! Route Request use case
//!
//! Claude models served through Vertex AI are listed under `anthropic` by
//! the gateway but have to be called through the Google endpoint.

use super::load_models::{LoadModelsRequest, LoadModelsUseCase};
use chatrelay_domain::{ChatRequest, Endpoint, reroute_endpoint};
use std::sync::Arc;
use tracing::{info, warn};

pub struct RequestRouter {
    models: Arc<LoadModelsUseCase>,
}

impl RequestRouter {
    pub fn new(models: Arc<LoadModelsUseCase>) -> Self {
        Self { models }
    }

    /// Return the request with its endpoint corrected for the model's
    /// provider. Catalog failures leave the request untouched.
    pub async fn route(&self, mut request: ChatRequest) -> ChatRequest {
        if request.endpoint != Endpoint::Anthropic {
            return request;
        }
        // Only the top-level model is consulted, not `model_parameters.model`
        let Some(model) = request.model.clone().filter(|m| !m.is_empty()) else {
            return request;
        };

        let mut load = LoadModelsRequest::new(request.user.clone());
        load.authorization = request.authorization.clone();

        let catalog = match self.models.execute(&load).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Model catalog unavailable, not rerouting {}: {}", model, e);
                return request;
            }
        };

        let target = reroute_endpoint(&request.endpoint, &model, &catalog);
        if target != request.endpoint {
            info!("Rerouting {} from {} to {}", model, request.endpoint, target);
            request.endpoint = target;
        }
        request
    }
}
