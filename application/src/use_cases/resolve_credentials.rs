//! Resolve Credentials use case
//!
//! Determines the API key, base URL and OpenID passthrough for one request.
//! An expired user key is rejected before the key store is consulted.

use crate::config::AppConfig;
use crate::ports::user_key_store::{UserKeyStore, UserKeyStoreError};
use chatrelay_domain::{
    ChatRequest, CredentialInput, Endpoint, ErrorKind, ResolveError, ResolvedCredentials,
    UserKeyValues, check_user_key_expiry, resolve_credentials,
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while resolving credentials or client options
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("User key lookup failed: {0}")]
    UserKeys(#[from] UserKeyStoreError),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
}

impl CredentialError {
    /// Machine-readable kind for errors the UI can act on.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CredentialError::Resolve(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Credentials plus the stored user values they were derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialResolution {
    pub credentials: ResolvedCredentials,
    pub user_values: Option<UserKeyValues>,
}

/// Configured credential sources of one endpoint, env references expanded.
#[derive(Debug, Clone, Default)]
struct EndpointCredentials {
    credential: Option<String>,
    base_url: Option<String>,
    default_base_url: Option<String>,
    key_supplied_by_config: bool,
}

fn endpoint_credentials(
    endpoint: &Endpoint,
    config: &AppConfig,
) -> Result<EndpointCredentials, CredentialError> {
    let env = &config.env;
    match endpoint {
        Endpoint::Custom(name) => {
            let custom = config
                .endpoints
                .custom_endpoint(name)
                .ok_or_else(|| CredentialError::UnknownEndpoint(name.clone()))?;
            Ok(EndpointCredentials {
                credential: custom.api_key.as_deref().map(|k| env.expand(k)),
                base_url: custom.base_url.as_deref().map(|u| env.expand(u)),
                ..Default::default()
            })
        }
        builtin => Ok(EndpointCredentials {
            credential: env.credential_for(builtin).map(str::to_string),
            base_url: env.base_url_for(builtin).map(str::to_string),
            default_base_url: config
                .endpoints
                .base(builtin)
                .and_then(|b| b.base_url.clone()),
            key_supplied_by_config: *builtin == Endpoint::AzureOpenAI
                && config
                    .endpoints
                    .azure_openai
                    .as_ref()
                    .is_some_and(|a| !a.group_map.is_empty()),
        }),
    }
}

/// Use case for resolving per-request credentials
pub struct ResolveCredentialsUseCase {
    config: Arc<AppConfig>,
    user_keys: Arc<dyn UserKeyStore>,
}

impl ResolveCredentialsUseCase {
    pub fn new(config: Arc<AppConfig>, user_keys: Arc<dyn UserKeyStore>) -> Self {
        Self { config, user_keys }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn execute(&self, request: &ChatRequest) -> Result<CredentialResolution, CredentialError> {
        let endpoint = &request.endpoint;
        let settings = endpoint_credentials(endpoint, &self.config)?;

        let input = CredentialInput {
            endpoint,
            user_id: &request.user.id,
            authorization: request.authorization.as_deref(),
            expires_at: request.key_expires_at,
            credential: settings.credential.as_deref(),
            base_url: settings.base_url.as_deref(),
            default_base_url: settings.default_base_url.as_deref(),
            gateway_url: self.config.env.gateway_url(),
            key_supplied_by_config: settings.key_supplied_by_config,
        };

        let user_values = if input.needs_user_values() {
            if let Some(expires_at) = input.expires_at {
                check_user_key_expiry(expires_at, Utc::now(), endpoint)?;
            }
            debug!("Loading stored key for {} (user {})", endpoint, input.user_id);
            self.user_keys
                .get_user_key_values(input.user_id, endpoint)
                .await?
        } else {
            None
        };

        let credentials = resolve_credentials(&input, user_values.as_ref())?;
        Ok(CredentialResolution {
            credentials,
            user_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockUserKeyStore;
    use chatrelay_domain::config::env::vars;
    use chatrelay_domain::{CustomEndpointConfig, EndpointsConfig, EnvSettings, RequestUser};
    use chrono::Duration;

    fn use_case(env: EnvSettings, store: Arc<MockUserKeyStore>) -> ResolveCredentialsUseCase {
        let config = AppConfig::new(
            EndpointsConfig {
                custom: vec![CustomEndpointConfig {
                    name: "litellm".to_string(),
                    api_key: Some("${LITELLM_KEY}".to_string()),
                    base_url: Some("http://litellm:4000/v1".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            },
            env,
        );
        ResolveCredentialsUseCase::new(Arc::new(config), store)
    }

    fn request(endpoint: Endpoint) -> ChatRequest {
        ChatRequest::new(endpoint, RequestUser::new("u1"))
    }

    #[tokio::test]
    async fn test_expired_key_fails_before_store_access() {
        let store = Arc::new(MockUserKeyStore::default());
        let env = EnvSettings::from_vars([(vars::OPENAI_API_KEY, "user_provided")]);
        let use_case = use_case(env, Arc::clone(&store));

        let request = request(Endpoint::OpenAI).with_key_expiry(Utc::now() - Duration::minutes(5));
        let err = use_case.execute(&request).await.unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::ExpiredUserKey));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_user_provided_key_is_loaded() {
        let store = Arc::new(MockUserKeyStore::default().with(
            "u1",
            &Endpoint::OpenAI,
            UserKeyValues {
                api_key: Some("sk-user".to_string()),
                base_url: None,
            },
        ));
        let env = EnvSettings::from_vars([(vars::OPENAI_API_KEY, "user_provided")]);
        let use_case = use_case(env, Arc::clone(&store));

        let request = request(Endpoint::OpenAI).with_key_expiry(Utc::now() + Duration::days(1));
        let resolution = use_case.execute(&request).await.unwrap();

        assert_eq!(resolution.credentials.api_key.as_deref(), Some("sk-user"));
        assert!(resolution.credentials.user_provides_key);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_user_provided_without_stored_key() {
        let store = Arc::new(MockUserKeyStore::default());
        let env = EnvSettings::from_vars([(vars::ANTHROPIC_API_KEY, "user_provided")]);
        let err = use_case(env, store)
            .execute(&request(Endpoint::Anthropic))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NoUserKey));
    }

    #[tokio::test]
    async fn test_static_key_skips_store() {
        let store = Arc::new(MockUserKeyStore::default());
        let env = EnvSettings::from_vars([
            (vars::OPENAI_API_KEY, "sk-env"),
            (vars::LITELLM_URL, "http://litellm:4000"),
        ]);
        let resolution = use_case(env, Arc::clone(&store))
            .execute(&request(Endpoint::OpenAI))
            .await
            .unwrap();

        assert_eq!(resolution.credentials.api_key.as_deref(), Some("sk-env"));
        assert_eq!(
            resolution.credentials.base_url.as_deref(),
            Some("http://litellm:4000")
        );
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_endpoint_expands_env() {
        let env = EnvSettings::from_vars([("LITELLM_KEY", "sk-gw")]);
        let resolution = use_case(env, Arc::new(MockUserKeyStore::default()))
            .execute(&request(Endpoint::custom("litellm")))
            .await
            .unwrap();

        assert_eq!(resolution.credentials.api_key.as_deref(), Some("sk-gw"));
        assert_eq!(
            resolution.credentials.base_url.as_deref(),
            Some("http://litellm:4000/v1")
        );
    }

    #[tokio::test]
    async fn test_unknown_custom_endpoint() {
        let err = use_case(EnvSettings::new(), Arc::new(MockUserKeyStore::default()))
            .execute(&request(Endpoint::custom("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::UnknownEndpoint(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_openid_missing_header() {
        let env = EnvSettings::from_vars([(vars::OPENAI_API_KEY, "openid")]);
        let err = use_case(env, Arc::new(MockUserKeyStore::default()))
            .execute(&request(Endpoint::OpenAI))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingAuthHeader));
    }
}
