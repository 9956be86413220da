//! Load Models use case
//!
//! Builds the [`ModelCatalog`]: cached result first, then either the
//! LiteLLM gateway's `/model/info` (when a gateway URL is configured) or
//! the built-in defaults plus custom endpoint listings.
//!
//! Custom endpoints sharing a `(baseURL, apiKey)` pair are fetched once per
//! call, all fetches running concurrently. A failed or empty fetch falls
//! back to the endpoint's configured default list. Nothing is retried.

use crate::config::AppConfig;
use crate::ports::config_store::{ConfigStore, ConfigStoreError, cache_keys};
use crate::ports::model_source::{FetchModelsRequest, ModelSource};
use chatrelay_domain::catalog::default_models;
use chatrelay_domain::credential::is_user_provided;
use chatrelay_domain::options::resolve_headers;
use chatrelay_domain::{Endpoint, ModelCatalog, RequestUser, catalog_from_model_info};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Errors that can occur while loading models
#[derive(Error, Debug)]
pub enum LoadModelsError {
    #[error("Config store error: {0}")]
    Store(#[from] ConfigStoreError),
}

/// Caller context for a catalog load.
#[derive(Debug, Clone, Default)]
pub struct LoadModelsRequest {
    pub user: RequestUser,
    /// Forwarded to gateway endpoints.
    pub authorization: Option<String>,
}

impl LoadModelsRequest {
    pub fn new(user: RequestUser) -> Self {
        Self {
            user,
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }
}

/// Lifecycle of one upstream listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchState {
    Pending,
    Fetching,
    Resolved { models: usize },
    FailedFallback { reason: String },
}

/// One deduplicated fetch and the endpoints it served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub base_url: String,
    pub endpoints: Vec<String>,
    pub state: FetchState,
}

impl FetchReport {
    fn new(base_url: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints,
            state: FetchState::Pending,
        }
    }

    fn begin(&mut self) {
        if self.state == FetchState::Pending {
            self.state = FetchState::Fetching;
        }
    }

    fn resolve(&mut self, models: usize) {
        if self.state == FetchState::Fetching {
            self.state = FetchState::Resolved { models };
        }
    }

    fn fall_back(&mut self, reason: impl Into<String>) {
        if self.state == FetchState::Fetching {
            self.state = FetchState::FailedFallback {
                reason: reason.into(),
            };
        }
    }
}

/// What a load did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub cache_hit: bool,
    pub from_gateway: bool,
    pub fetches: Vec<FetchReport>,
}

/// Endpoints served by one deduplicated fetch.
struct FetchGroup {
    request: FetchModelsRequest,
    members: Vec<(Endpoint, Vec<String>)>,
}

/// Use case for loading the model catalog
pub struct LoadModelsUseCase {
    config: Arc<AppConfig>,
    store: Arc<dyn ConfigStore>,
    source: Arc<dyn ModelSource>,
}

impl LoadModelsUseCase {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn ConfigStore>,
        source: Arc<dyn ModelSource>,
    ) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    pub async fn execute(&self, request: &LoadModelsRequest) -> Result<ModelCatalog, LoadModelsError> {
        Ok(self.execute_with_report(request).await?.0)
    }

    /// Drop the cached catalog and load it again.
    pub async fn refresh(
        &self,
        request: &LoadModelsRequest,
    ) -> Result<(ModelCatalog, LoadReport), LoadModelsError> {
        self.store.invalidate(cache_keys::MODELS_CONFIG).await?;
        self.execute_with_report(request).await
    }

    pub async fn execute_with_report(
        &self,
        request: &LoadModelsRequest,
    ) -> Result<(ModelCatalog, LoadReport), LoadModelsError> {
        if let Some(catalog) = self.cached().await? {
            debug!("Model catalog served from cache");
            return Ok((
                catalog,
                LoadReport {
                    cache_hit: true,
                    ..Default::default()
                },
            ));
        }

        let (catalog, report, cacheable) = match self.config.env.gateway_url() {
            Some(url) => self.load_from_gateway(url, request).await,
            None => {
                let mut catalog = self.default_catalog();
                let (custom, fetches) = self.load_custom_models(request).await;
                catalog.merge(custom);
                (
                    catalog,
                    LoadReport {
                        fetches,
                        ..Default::default()
                    },
                    true,
                )
            }
        };

        if cacheable {
            match serde_json::to_value(&catalog) {
                Ok(value) => {
                    if let Err(e) = self.store.set(cache_keys::MODELS_CONFIG, value).await {
                        warn!("Could not cache model catalog: {}", e);
                    }
                }
                Err(e) => warn!("Could not serialize model catalog for caching: {}", e),
            }
        }

        info!(
            "Loaded {} models across {} endpoints",
            catalog.model_count(),
            catalog.endpoints.len()
        );
        Ok((catalog, report))
    }

    async fn cached(&self) -> Result<Option<ModelCatalog>, LoadModelsError> {
        let Some(value) = self.store.get(cache_keys::MODELS_CONFIG).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(catalog) => Ok(Some(catalog)),
            Err(e) => {
                warn!("Ignoring unreadable cached model catalog: {}", e);
                Ok(None)
            }
        }
    }

    /// Gateway mode. A failed fetch yields an empty catalog that is not cached.
    async fn load_from_gateway(
        &self,
        url: &str,
        request: &LoadModelsRequest,
    ) -> (ModelCatalog, LoadReport, bool) {
        let mut fetch = FetchReport::new(url, vec!["litellm".to_string()]);
        fetch.begin();

        let result = self
            .source
            .fetch_model_info(url, request.authorization.as_deref())
            .await;

        let (catalog, cacheable) = match result {
            Ok(info) => {
                let catalog = catalog_from_model_info(&info);
                info!("Loaded {} endpoints from LiteLLM", catalog.endpoints.len());
                fetch.resolve(catalog.model_count());
                (catalog, true)
            }
            Err(e) => {
                warn!("Error fetching models from LiteLLM: {}", e);
                fetch.fall_back(e.to_string());
                (ModelCatalog::new(), false)
            }
        };

        let report = LoadReport {
            from_gateway: true,
            fetches: vec![fetch],
            ..Default::default()
        };
        (catalog, report, cacheable)
    }

    /// Azure model names and built-in lists for credentialed endpoints.
    fn default_catalog(&self) -> ModelCatalog {
        let env = &self.config.env;
        let endpoints = &self.config.endpoints;
        let mut catalog = ModelCatalog::new();

        for endpoint in [
            Endpoint::OpenAI,
            Endpoint::Anthropic,
            Endpoint::Google,
            Endpoint::Bedrock,
        ] {
            if env.credential_for(&endpoint).is_none() {
                continue;
            }
            let models = endpoints
                .base(&endpoint)
                .map(|b| b.models.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    default_models(&endpoint)
                        .iter()
                        .map(|m| m.to_string())
                        .collect()
                });
            catalog.insert(&endpoint, models);
        }

        if let Some(azure) = &endpoints.azure_openai
            && !azure.model_names.is_empty()
        {
            catalog.insert(&Endpoint::AzureOpenAI, azure.model_names.clone());
        }

        catalog
    }

    async fn load_custom_models(&self, request: &LoadModelsRequest) -> (ModelCatalog, Vec<FetchReport>) {
        let env = &self.config.env;
        let mut catalog = ModelCatalog::new();
        let mut groups: BTreeMap<(String, String), FetchGroup> = BTreeMap::new();

        for custom in self.config.endpoints.custom.iter().filter(|c| c.is_complete()) {
            let endpoint = custom.endpoint();
            let api_key = env.expand(custom.api_key.as_deref().unwrap_or_default());
            let base_url = env.expand(custom.base_url.as_deref().unwrap_or_default());
            let defaults = custom.models.default.clone();

            if custom.models.fetch && !is_user_provided(Some(&base_url)) {
                let mut headers = resolve_headers(&custom.headers, Some(&request.user), env);
                if endpoint.is_gateway()
                    && let Some(auth) = &request.authorization
                {
                    headers.insert(AUTHORIZATION_HEADER.to_string(), auth.clone());
                }
                let key_usable = !is_user_provided(Some(&api_key));

                if key_usable || !headers.is_empty() {
                    groups
                        .entry((base_url.clone(), api_key.clone()))
                        .or_insert_with(|| FetchGroup {
                            request: FetchModelsRequest {
                                endpoint_name: endpoint.to_string(),
                                base_url: base_url.clone(),
                                api_key: key_usable.then(|| api_key.clone()),
                                user_id: request.user.id.clone(),
                                direct: custom.direct_endpoint,
                                user_id_query: custom.models.user_id_query,
                                headers,
                            },
                            members: Vec::new(),
                        })
                        .members
                        .push((endpoint, defaults));
                    continue;
                }
            }

            catalog.insert(&endpoint, defaults);
        }

        let groups: Vec<FetchGroup> = groups.into_values().collect();
        let mut reports: Vec<FetchReport> = groups
            .iter()
            .map(|g| {
                FetchReport::new(
                    g.request.base_url.clone(),
                    g.members.iter().map(|(e, _)| e.to_string()).collect(),
                )
            })
            .collect();

        reports.iter_mut().for_each(FetchReport::begin);
        debug!("Fetching models from {} unique upstreams", groups.len());
        let results = join_all(groups.iter().map(|g| self.source.fetch_models(&g.request))).await;

        for ((group, report), result) in groups.into_iter().zip(reports.iter_mut()).zip(results) {
            match result {
                Ok(models) if !models.is_empty() => {
                    report.resolve(models.len());
                    for (endpoint, _) in group.members {
                        catalog.insert(&endpoint, models.clone());
                    }
                }
                outcome => {
                    let reason = match outcome {
                        Err(e) => e.to_string(),
                        Ok(_) => "empty model list".to_string(),
                    };
                    warn!(
                        "Fetching models from {} failed ({}), using configured defaults",
                        group.request.base_url, reason
                    );
                    report.fall_back(reason);
                    for (endpoint, defaults) in group.members {
                        catalog.insert(&endpoint, defaults);
                    }
                }
            }
        }

        (catalog, reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_source::UpstreamError;
    use crate::test_support::{MockConfigStore, MockModelSource};
    use chatrelay_domain::config::env::vars;
    use chatrelay_domain::{
        AzureEndpointConfig, AzureGroup, AzureModelSpec, CustomEndpointConfig, CustomModelsConfig,
        EndpointsConfig, EnvSettings, VERTEX_AI_ANTHROPIC,
    };
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn custom(name: &str, base_url: &str, key: &str, fetch: bool, defaults: &[&str]) -> CustomEndpointConfig {
        CustomEndpointConfig {
            name: name.to_string(),
            api_key: Some(key.to_string()),
            base_url: Some(base_url.to_string()),
            models: CustomModelsConfig {
                default: defaults.iter().map(|m| m.to_string()).collect(),
                fetch,
                user_id_query: false,
            },
            ..Default::default()
        }
    }

    fn use_case(
        endpoints: EndpointsConfig,
        env: EnvSettings,
        store: Arc<MockConfigStore>,
        source: Arc<MockModelSource>,
    ) -> LoadModelsUseCase {
        LoadModelsUseCase::new(Arc::new(AppConfig::new(endpoints, env)), store, source)
    }

    fn request() -> LoadModelsRequest {
        LoadModelsRequest::new(RequestUser::new("u1")).with_authorization("Bearer caller")
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_catalog() {
        let endpoints = EndpointsConfig {
            custom: vec![custom("local", "http://local/v1", "k", false, &["m1"])],
            ..Default::default()
        };
        let store = Arc::new(MockConfigStore::read_only());
        let use_case = use_case(
            endpoints,
            EnvSettings::new(),
            store.clone(),
            Arc::new(MockModelSource::default()),
        );

        let (catalog, report) = use_case.execute_with_report(&request()).await.unwrap();
        assert_eq!(catalog.endpoints["local"], vec!["m1"]);
        assert!(!report.cache_hit);
        assert!(!store.contains(cache_keys::MODELS_CONFIG));
    }

    #[tokio::test]
    async fn test_shared_upstream_is_fetched_once() {
        let source = Arc::new(
            MockModelSource::default().with_models("http://gw/v1", Ok(vec!["m1", "m2"])),
        );
        let endpoints = EndpointsConfig {
            custom: vec![
                custom("alpha", "http://gw/v1", "${GW_KEY}", true, &[]),
                custom("beta", "http://gw/v1", "${GW_KEY}", true, &[]),
            ],
            ..Default::default()
        };
        let env = EnvSettings::from_vars([("GW_KEY", "k")]);
        let use_case = use_case(endpoints, env, Arc::default(), Arc::clone(&source));

        let (catalog, report) = use_case.execute_with_report(&request()).await.unwrap();

        assert_eq!(source.fetch_count(), 1);
        assert_eq!(catalog.endpoints["alpha"], vec!["m1", "m2"]);
        assert_eq!(catalog.endpoints["beta"], vec!["m1", "m2"]);
        assert_eq!(report.fetches.len(), 1);
        assert_eq!(report.fetches[0].endpoints, vec!["alpha", "beta"]);
        assert_eq!(report.fetches[0].state, FetchState::Resolved { models: 2 });
        assert_eq!(source.requests.lock().unwrap()[0].api_key.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_different_keys_are_fetched_separately() {
        let source = Arc::new(MockModelSource::default().with_models("http://gw/v1", Ok(vec!["m1"])));
        let endpoints = EndpointsConfig {
            custom: vec![
                custom("alpha", "http://gw/v1", "k1", true, &[]),
                custom("beta", "http://gw/v1", "k2", true, &[]),
            ],
            ..Default::default()
        };
        let use_case = use_case(endpoints, EnvSettings::new(), Arc::default(), Arc::clone(&source));
        use_case.execute(&request()).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_defaults() {
        let source = Arc::new(
            MockModelSource::default()
                .with_models("http://down/v1", Err(UpstreamError::Status { status: 503 }))
                .with_models("http://empty/v1", Ok(vec![])),
        );
        let endpoints = EndpointsConfig {
            custom: vec![
                custom("down", "http://down/v1", "k", true, &["fallback-a"]),
                custom("empty", "http://empty/v1", "k", true, &["fallback-b"]),
                custom("bare", "http://down/v1", "other", true, &[]),
            ],
            ..Default::default()
        };
        let store = Arc::new(MockConfigStore::default());
        let use_case = use_case(endpoints, EnvSettings::new(), Arc::clone(&store), source);

        let (catalog, report) = use_case.execute_with_report(&request()).await.unwrap();

        assert_eq!(catalog.endpoints["down"], vec!["fallback-a"]);
        assert_eq!(catalog.endpoints["empty"], vec!["fallback-b"]);
        assert!(catalog.endpoints["bare"].is_empty());
        assert!(
            report
                .fetches
                .iter()
                .all(|f| matches!(f.state, FetchState::FailedFallback { .. }))
        );
        // degraded results are cached too
        assert!(store.contains(cache_keys::MODELS_CONFIG));
    }

    #[tokio::test]
    async fn test_static_and_incomplete_endpoints() {
        let source = Arc::new(MockModelSource::default());
        let mut incomplete = custom("broken", "http://x", "k", true, &[]);
        incomplete.api_key = None;
        let endpoints = EndpointsConfig {
            custom: vec![
                custom("static", "http://x", "k", false, &["s1"]),
                custom("byok", "user_provided", "k", true, &["u1"]),
                incomplete,
            ],
            ..Default::default()
        };
        let use_case = use_case(endpoints, EnvSettings::new(), Arc::default(), Arc::clone(&source));

        let catalog = use_case.execute(&request()).await.unwrap();
        assert_eq!(catalog.endpoints["static"], vec!["s1"]);
        assert_eq!(catalog.endpoints["byok"], vec!["u1"]);
        assert!(!catalog.endpoints.contains_key("broken"));
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_endpoint_forwards_authorization() {
        let source = Arc::new(MockModelSource::default().with_models("http://lite/v1", Ok(vec!["m"])));
        let endpoints = EndpointsConfig {
            custom: vec![
                custom("LiteLLM", "http://lite/v1", "k", true, &[]),
                custom("openrouter", "http://or/v1", "k", true, &[]),
            ],
            ..Default::default()
        };
        let use_case = use_case(endpoints, EnvSettings::new(), Arc::default(), Arc::clone(&source));
        use_case.execute(&request()).await.unwrap();

        let requests = source.requests.lock().unwrap();
        let lite = requests.iter().find(|r| r.base_url == "http://lite/v1").unwrap();
        let other = requests.iter().find(|r| r.base_url == "http://or/v1").unwrap();
        assert_eq!(lite.headers["Authorization"], "Bearer caller");
        assert!(!other.headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let source = Arc::new(MockModelSource::default().with_models("http://gw/v1", Ok(vec!["m"])));
        let endpoints = EndpointsConfig {
            custom: vec![custom("gw", "http://gw/v1", "k", true, &[])],
            ..Default::default()
        };
        let use_case = use_case(endpoints, EnvSettings::new(), Arc::default(), Arc::clone(&source));

        let first = use_case.execute(&request()).await.unwrap();
        let (second, report) = use_case.execute_with_report(&request()).await.unwrap();

        assert_eq!(first, second);
        assert!(report.cache_hit);
        assert_eq!(source.fetch_count(), 1);

        use_case.refresh(&request()).await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_defaults_for_credentialed_endpoints() {
        let endpoints = EndpointsConfig {
            azure_openai: Some(AzureEndpointConfig::default().with_group(
                "g1",
                AzureGroup::default(),
                [AzureModelSpec::new("gpt-4-turbo"), AzureModelSpec::new("gpt-35")],
            )),
            ..Default::default()
        };
        let env = EnvSettings::from_vars([(vars::OPENAI_API_KEY, "sk")]);
        let use_case = use_case(endpoints, env, Arc::default(), Arc::default());

        let catalog = use_case.execute(&request()).await.unwrap();
        assert_eq!(catalog.endpoints["azureOpenAI"], vec!["gpt-4-turbo", "gpt-35"]);
        assert!(catalog.endpoints["openAI"].contains(&"gpt-4o".to_string()));
        assert!(!catalog.endpoints.contains_key("anthropic"));
    }

    #[tokio::test]
    async fn test_gateway_mode_classifies_and_caches() {
        let source = Arc::new(MockModelSource::default().with_model_info(Ok(json!({
            "data": [
                {"model_name": "gpt-4o", "model_info": {"litellm_provider": "openai"}},
                {"model_name": "embed", "model_info": {"litellm_provider": "openai", "mode": "embedding"}},
                {"model_name": "claude-v", "model_info": {"litellm_provider": VERTEX_AI_ANTHROPIC}}
            ]
        }))));
        let store = Arc::new(MockConfigStore::default());
        let env = EnvSettings::from_vars([(vars::LITELLM_URL, "http://litellm:4000")]);
        let use_case = use_case(EndpointsConfig::default(), env, Arc::clone(&store), Arc::clone(&source));

        let (catalog, report) = use_case.execute_with_report(&request()).await.unwrap();

        assert!(report.from_gateway);
        assert_eq!(catalog.endpoints["openAI"], vec!["gpt-4o"]);
        assert_eq!(catalog.endpoints["anthropic"], vec!["claude-v"]);
        assert_eq!(catalog.provider_of("claude-v"), Some(VERTEX_AI_ANTHROPIC));
        let cached = store.value(cache_keys::MODELS_CONFIG).unwrap();
        assert_eq!(cached["_modelProviders"]["claude-v"], VERTEX_AI_ANTHROPIC);
        assert_eq!(source.info_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_yields_uncached_empty_catalog() {
        let source = Arc::new(
            MockModelSource::default().with_model_info(Err(UpstreamError::Timeout)),
        );
        let store = Arc::new(MockConfigStore::default());
        let env = EnvSettings::from_vars([(vars::LITELLM_URL, "http://litellm:4000")]);
        let use_case = use_case(EndpointsConfig::default(), env, Arc::clone(&store), source);

        let (catalog, report) = use_case.execute_with_report(&request()).await.unwrap();
        assert!(catalog.is_empty());
        assert!(matches!(report.fetches[0].state, FetchState::FailedFallback { .. }));
        assert!(!store.contains(cache_keys::MODELS_CONFIG));
    }

    #[test]
    fn test_fetch_state_transitions() {
        let mut report = FetchReport::new("http://x", vec![]);
        report.resolve(3);
        assert_eq!(report.state, FetchState::Pending);
        report.begin();
        assert_eq!(report.state, FetchState::Fetching);
        report.resolve(3);
        report.fall_back("late");
        assert_eq!(report.state, FetchState::Resolved { models: 3 });
    }
}
