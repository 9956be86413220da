//! Guardrails use case
//!
//! Lists the guardrails offered by the LiteLLM gateway and checks that the
//! configured required guardrails are among them.

use crate::config::AppConfig;
use crate::ports::model_source::ModelSource;
use chatrelay_domain::{Guardrail, GuardrailValidation, validate_required_guardrails};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardrailsError {
    #[error("LITELLM_URL is not configured")]
    GatewayNotConfigured,
}

pub struct GuardrailsUseCase {
    config: Arc<AppConfig>,
    source: Arc<dyn ModelSource>,
}

impl GuardrailsUseCase {
    pub fn new(config: Arc<AppConfig>, source: Arc<dyn ModelSource>) -> Self {
        Self { config, source }
    }

    /// Guardrails offered by the gateway. Upstream failures yield an empty list.
    pub async fn list(&self, authorization: Option<&str>) -> Result<Vec<Guardrail>, GuardrailsError> {
        let url = self
            .config
            .env
            .gateway_url()
            .ok_or(GuardrailsError::GatewayNotConfigured)?;

        match self.source.fetch_guardrails(url, authorization).await {
            Ok(guardrails) => {
                debug!("Gateway offers {} guardrails", guardrails.len());
                Ok(guardrails)
            }
            Err(e) => {
                warn!("Error fetching guardrails from {}: {}", url, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn validate(
        &self,
        authorization: Option<&str>,
    ) -> Result<GuardrailValidation, GuardrailsError> {
        let available = self.list(authorization).await?;
        let validation = validate_required_guardrails(&self.config.required_guardrails, &available);
        if !validation.is_valid {
            warn!("Required guardrails not offered: {:?}", validation.invalid);
        }
        Ok(validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_source::UpstreamError;
    use crate::test_support::MockModelSource;
    use chatrelay_domain::config::env::vars;
    use chatrelay_domain::{EndpointsConfig, EnvSettings};

    fn use_case(env: EnvSettings, source: MockModelSource, required: &[&str]) -> GuardrailsUseCase {
        let mut config = AppConfig::new(EndpointsConfig::default(), env);
        config.required_guardrails = required.iter().map(|s| s.to_string()).collect();
        GuardrailsUseCase::new(Arc::new(config), Arc::new(source))
    }

    fn gateway_env() -> EnvSettings {
        EnvSettings::from_vars([(vars::LITELLM_URL, "http://litellm:4000")])
    }

    #[tokio::test]
    async fn test_missing_gateway_is_a_config_error() {
        let use_case = use_case(EnvSettings::new(), MockModelSource::default(), &[]);
        assert_eq!(
            use_case.list(None).await.unwrap_err(),
            GuardrailsError::GatewayNotConfigured
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_list() {
        let source =
            MockModelSource::default().with_guardrails(Err(UpstreamError::Status { status: 500 }));
        let use_case = use_case(gateway_env(), source, &[]);
        assert!(use_case.list(Some("Bearer t")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_reports_missing_names() {
        let source = MockModelSource::default().with_guardrails(Ok(vec![
            Guardrail::Name("pii".to_string()),
            Guardrail::Detailed {
                guardrail_name: "toxicity".to_string(),
                extra: Default::default(),
            },
        ]));
        let use_case = use_case(gateway_env(), source, &["pii", "toxicity", "jailbreak"]);

        let validation = use_case.validate(None).await.unwrap();
        assert!(!validation.is_valid);
        assert_eq!(validation.invalid, vec!["jailbreak"]);
    }
}
