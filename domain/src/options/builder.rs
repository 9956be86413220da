//! Client options merge.
//!
//! Sources are applied in increasing precedence:
//!
//! 1. compiled defaults and the environment snapshot
//! 2. endpoint configuration
//! 3. Azure group overrides
//! 4. `endpoints.all.stream_rate`
//! 5. per-request `model_parameters`
//! 6. an explicit override model
//!
//! The merge is a pure function of its inputs.

use super::client_options::{ClientOptions, ContextStrategy};
use super::headers::resolve_headers;
use crate::azure::{AzureOptions, map_model_to_azure_config, resolve_stream_rate};
use crate::config::{EndpointsConfig, EnvSettings, env::vars};
use crate::core::error::ResolveError;
use crate::credential::{ResolvedCredentials, UserKeyValues};
use crate::endpoint::Endpoint;
use crate::request::ChatRequest;
use serde_json::Value;

const DEFAULT_TITLE_METHOD: &str = "completion";
const API_KEY_HEADER: &str = "api-key";
const API_VERSION_QUERY: &str = "api-version";

/// Everything the merge reads. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptionsInput<'a> {
    pub request: &'a ChatRequest,
    pub credentials: &'a ResolvedCredentials,
    /// Stored user values, needed when an Azure user key holds JSON options.
    pub user_values: Option<&'a UserKeyValues>,
    pub endpoints: &'a EndpointsConfig,
    pub env: &'a EnvSettings,
    pub override_model: Option<&'a str>,
}

/// Merge all configuration sources into the options for one request.
pub fn build_client_options(input: &ClientOptionsInput<'_>) -> Result<ClientOptions, ResolveError> {
    let request = input.request;
    let endpoint = &request.endpoint;
    let env = input.env;
    let credentials = input.credentials;
    let model = request.effective_model(input.override_model);

    let mut options = ClientOptions {
        api_key: credentials.api_key.clone(),
        reverse_proxy_url: credentials.base_url.clone(),
        auth_header: credentials.auth_header.clone(),
        proxy: env.proxy().map(str::to_string),
        debug: env.is_enabled(vars::DEBUG_OPENAI),
        context_strategy: (endpoint.is_openai_compatible()
            && env.is_enabled(vars::OPENAI_SUMMARIZE))
        .then_some(ContextStrategy::Summarize),
        ..Default::default()
    };

    let mut serverless = false;
    match endpoint {
        Endpoint::AzureOpenAI => serverless = apply_azure(&mut options, model, input)?,
        Endpoint::Custom(name) => {
            if let Some(custom) = input.endpoints.custom_endpoint(name) {
                options.stream_rate = custom.stream_rate;
                options.title_model = custom.title_model.clone();
                options.headers.extend(custom.headers.clone());
            }
        }
        builtin => {
            if let Some(base) = input.endpoints.base(builtin) {
                options.stream_rate = base.stream_rate;
                options.title_model = base.title_model.clone();
            }
        }
    }

    if !credentials.use_openid && options.api_key.is_none() {
        return Err(if credentials.user_provides_key {
            ResolveError::NoUserKey {
                endpoint: endpoint.clone(),
            }
        } else {
            ResolveError::MissingApiKey {
                endpoint: endpoint.clone(),
            }
        });
    }

    if let Some(rate) = input.endpoints.global_stream_rate() {
        options.stream_rate = Some(rate);
    }

    let mut model_options = options.add_params.clone();
    model_options.extend(request.model_parameters.clone());
    if let Some(model) = model {
        model_options.insert("model".to_string(), Value::String(model.to_string()));
    }
    for param in &options.drop_params {
        if param != "model" && param != "user" {
            model_options.remove(param);
        }
    }
    model_options.insert("user".to_string(), Value::String(request.user.id.clone()));
    options.model_options = model_options;

    options.headers = resolve_headers(&options.headers, Some(&request.user), env);
    if serverless && let Some(key) = options.api_key.clone() {
        options.headers.insert(API_KEY_HEADER.to_string(), key);
    }

    Ok(options)
}

/// Apply Azure routing. Returns whether the route is serverless.
fn apply_azure(
    options: &mut ClientOptions,
    model: Option<&str>,
    input: &ClientOptionsInput<'_>,
) -> Result<bool, ResolveError> {
    let credentials = input.credentials;
    let endpoint = &input.request.endpoint;

    let Some(config) = input
        .endpoints
        .azure_openai
        .as_ref()
        .filter(|c| !c.group_map.is_empty())
    else {
        let azure = if credentials.use_openid || !credentials.user_provides_key {
            input.env.azure_credentials()
        } else {
            parse_user_azure_options(input.user_values, endpoint)?
        };
        if !credentials.use_openid {
            options.api_key = azure.api_key.clone();
        }
        options.azure = Some(azure);
        return Ok(false);
    };

    let model = model.unwrap_or_default();
    let route = map_model_to_azure_config(model, config, input.env)?;

    if let Some(url) = &route.base_url {
        options.reverse_proxy_url = Some(url.clone());
    }
    let mut headers = route.headers.clone();
    headers.extend(std::mem::take(&mut options.headers));
    options.headers = headers;

    options.title_convo = Some(config.title_convo);
    options.title_model = config.title_model.clone();
    options.title_method = Some(
        config
            .title_method
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE_METHOD.to_string()),
    );
    options.stream_rate = Some(resolve_stream_rate(model, config));

    options.add_params = route.add_params.clone();
    options.drop_params = route.drop_params.clone();
    options.force_prompt = route.force_prompt;

    if !credentials.use_openid {
        options.api_key = route.azure_options.api_key.clone();
    }

    if route.serverless {
        if let Some(version) = &route.azure_options.api_version {
            options
                .default_query
                .insert(API_VERSION_QUERY.to_string(), version.clone());
        }
        options.use_legacy_content = true;
    } else {
        options.azure = Some(route.azure_options);
    }
    Ok(route.serverless)
}

/// A user-provided Azure key is a JSON object of Azure options.
fn parse_user_azure_options(
    user_values: Option<&UserKeyValues>,
    endpoint: &Endpoint,
) -> Result<AzureOptions, ResolveError> {
    let raw = user_values
        .and_then(|v| v.api_key.as_deref())
        .ok_or_else(|| ResolveError::NoUserKey {
            endpoint: endpoint.clone(),
        })?;
    serde_json::from_str(raw).map_err(|e| ResolveError::InvalidUserKey {
        endpoint: endpoint.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{AzureEndpointConfig, AzureGroup, AzureModelSpec};
    use crate::config::{AllEndpointsConfig, BaseEndpointConfig, CustomEndpointConfig};
    use crate::request::RequestUser;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn user() -> RequestUser {
        RequestUser::new("user-1").with_email("u@example.com")
    }

    fn static_key(key: &str) -> ResolvedCredentials {
        ResolvedCredentials {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    fn build(
        request: &ChatRequest,
        credentials: &ResolvedCredentials,
        endpoints: &EndpointsConfig,
        env: &EnvSettings,
    ) -> Result<ClientOptions, ResolveError> {
        build_client_options(&ClientOptionsInput {
            request,
            credentials,
            user_values: None,
            endpoints,
            env,
            override_model: None,
        })
    }

    fn azure_endpoints(group: AzureGroup) -> EndpointsConfig {
        EndpointsConfig {
            azure_openai: Some(AzureEndpointConfig::default().with_group(
                "g1",
                group,
                [AzureModelSpec::new("gpt-4-turbo")],
            )),
            ..Default::default()
        }
    }

    #[test]
    fn test_azure_group_scenario() {
        let group = AzureGroup {
            api_key: Some("az-key".to_string()),
            base_url: Some("https://x".to_string()),
            add_params: json!({"api_version": "2024-01"}).as_object().unwrap().clone(),
            ..Default::default()
        };
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-4-turbo");

        let options = build(
            &request,
            &ResolvedCredentials::default(),
            &azure_endpoints(group),
            &EnvSettings::new(),
        )
        .unwrap();

        assert_eq!(options.reverse_proxy_url.as_deref(), Some("https://x"));
        assert_eq!(options.model_options["api_version"], "2024-01");
        assert_eq!(options.model_options["model"], "gpt-4-turbo");
        assert_eq!(options.model_options["user"], "user-1");
        assert_eq!(options.api_key.as_deref(), Some("az-key"));
        assert_eq!(options.stream_rate, Some(30));
        assert_eq!(options.title_method.as_deref(), Some("completion"));
    }

    #[test]
    fn test_azure_unknown_model_fails() {
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-5");
        let err = build(
            &request,
            &ResolvedCredentials::default(),
            &azure_endpoints(AzureGroup::default()),
            &EnvSettings::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownModelGroup { .. }));
    }

    #[test]
    fn test_azure_group_without_key_fails() {
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-4-turbo");
        let err = build(
            &request,
            &ResolvedCredentials::default(),
            &azure_endpoints(AzureGroup::default()),
            &EnvSettings::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingApiKey {
                endpoint: Endpoint::AzureOpenAI
            }
        );
    }

    #[test]
    fn test_azure_openid_keeps_forwarded_key() {
        let group = AzureGroup {
            api_key: Some("az-key".to_string()),
            ..Default::default()
        };
        let credentials = ResolvedCredentials {
            api_key: Some("Bearer tok".to_string()),
            auth_header: Some("Bearer tok".to_string()),
            use_openid: true,
            ..Default::default()
        };
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-4-turbo");

        let options = build(&request, &credentials, &azure_endpoints(group), &EnvSettings::new()).unwrap();
        assert_eq!(options.api_key.as_deref(), Some("Bearer tok"));
        assert_eq!(options.auth_header.as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_azure_serverless() {
        let group = AzureGroup {
            serverless: true,
            api_key: Some("sl-key".to_string()),
            version: Some("2024-05-01-preview".to_string()),
            base_url: Some("https://mistral.example/v1".to_string()),
            ..Default::default()
        };
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-4-turbo");

        let options = build(
            &request,
            &ResolvedCredentials::default(),
            &azure_endpoints(group),
            &EnvSettings::new(),
        )
        .unwrap();

        assert_eq!(options.azure, None);
        assert_eq!(options.default_query["api-version"], "2024-05-01-preview");
        assert_eq!(options.headers["api-key"], "sl-key");
        assert!(options.use_legacy_content);
    }

    #[test]
    fn test_azure_without_groups_uses_env_credentials() {
        let env = EnvSettings::from_vars([
            (vars::AZURE_API_KEY, "env-az"),
            (vars::AZURE_OPENAI_API_INSTANCE_NAME, "inst"),
        ]);
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-35");
        let options = build(&request, &static_key("env-az"), &EndpointsConfig::default(), &env).unwrap();

        let azure = options.azure.unwrap();
        assert_eq!(azure.instance_name.as_deref(), Some("inst"));
        assert_eq!(options.api_key.as_deref(), Some("env-az"));
    }

    #[test]
    fn test_azure_user_key_json() {
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user()).with_model("gpt-35");
        let credentials = ResolvedCredentials {
            user_provides_key: true,
            ..Default::default()
        };
        let endpoints = EndpointsConfig::default();
        let env = EnvSettings::new();

        let values = UserKeyValues {
            api_key: Some(r#"{"azureOpenAIApiKey":"uk","azureOpenAIApiInstanceName":"ui"}"#.to_string()),
            base_url: None,
        };
        let mut input = ClientOptionsInput {
            request: &request,
            credentials: &credentials,
            user_values: Some(&values),
            endpoints: &endpoints,
            env: &env,
            override_model: None,
        };
        let options = build_client_options(&input).unwrap();
        assert_eq!(options.api_key.as_deref(), Some("uk"));

        let broken = UserKeyValues {
            api_key: Some("not json".to_string()),
            base_url: None,
        };
        input.user_values = Some(&broken);
        assert!(matches!(
            build_client_options(&input),
            Err(ResolveError::InvalidUserKey { .. })
        ));
    }

    #[test]
    fn test_model_parameters_model_beats_request_model() {
        let request = ChatRequest::new(Endpoint::OpenAI, user())
            .with_model("gpt-4o")
            .with_parameter("model", json!("gpt-4o-mini"))
            .with_parameter("temperature", json!(0.2));

        let options = build(&request, &static_key("sk"), &EndpointsConfig::default(), &EnvSettings::new()).unwrap();
        assert_eq!(options.model(), Some("gpt-4o-mini"));
        assert_eq!(options.model_options["temperature"], 0.2);
    }

    #[test]
    fn test_override_model_beats_everything() {
        let request = ChatRequest::new(Endpoint::OpenAI, user())
            .with_model("gpt-4o")
            .with_parameter("model", json!("gpt-4o-mini"));
        let endpoints = EndpointsConfig::default();
        let env = EnvSettings::new();
        let credentials = static_key("sk");

        let options = build_client_options(&ClientOptionsInput {
            request: &request,
            credentials: &credentials,
            user_values: None,
            endpoints: &endpoints,
            env: &env,
            override_model: Some("o3"),
        })
        .unwrap();
        assert_eq!(options.model(), Some("o3"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let request = ChatRequest::new(Endpoint::OpenAI, user())
            .with_model("gpt-4o")
            .with_parameter("top_p", json!(0.9))
            .with_parameter("max_tokens", json!(100));
        let env = EnvSettings::from_vars([(vars::PROXY, "http://proxy")]);
        let endpoints = EndpointsConfig::default();

        let a = serde_json::to_string(&build(&request, &static_key("sk"), &endpoints, &env).unwrap()).unwrap();
        let b = serde_json::to_string(&build(&request, &static_key("sk"), &endpoints, &env).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_global_stream_rate_overrides_endpoint() {
        let request = ChatRequest::new(Endpoint::OpenAI, user()).with_model("gpt-4o");
        let mut endpoints = EndpointsConfig {
            openai: Some(BaseEndpointConfig {
                stream_rate: Some(25),
                title_model: Some("gpt-4o-mini".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = build(&request, &static_key("sk"), &endpoints, &EnvSettings::new()).unwrap();
        assert_eq!(options.stream_rate, Some(25));
        assert_eq!(options.title_model.as_deref(), Some("gpt-4o-mini"));

        endpoints.all = Some(AllEndpointsConfig { stream_rate: Some(5) });
        let options = build(&request, &static_key("sk"), &endpoints, &EnvSettings::new()).unwrap();
        assert_eq!(options.stream_rate, Some(5));

        endpoints.all = Some(AllEndpointsConfig { stream_rate: None });
        let options = build(&request, &static_key("sk"), &endpoints, &EnvSettings::new()).unwrap();
        assert_eq!(options.stream_rate, Some(25));
    }

    #[test]
    fn test_drop_params_never_drop_model_or_user() {
        let group = AzureGroup {
            api_key: Some("k".to_string()),
            drop_params: vec!["stop".to_string(), "model".to_string(), "user".to_string()],
            ..Default::default()
        };
        let request = ChatRequest::new(Endpoint::AzureOpenAI, user())
            .with_model("gpt-4-turbo")
            .with_parameter("stop", json!(["\n"]));

        let options = build(
            &request,
            &ResolvedCredentials::default(),
            &azure_endpoints(group),
            &EnvSettings::new(),
        )
        .unwrap();
        assert!(options.model_options.get("stop").is_none());
        assert_eq!(options.model_options["model"], "gpt-4-turbo");
        assert_eq!(options.model_options["user"], "user-1");
    }

    #[test]
    fn test_custom_endpoint_headers_are_resolved() {
        let endpoints = EndpointsConfig {
            custom: vec![CustomEndpointConfig {
                name: "litellm".to_string(),
                headers: BTreeMap::from([
                    ("X-User".to_string(), "{{LIBRECHAT_USER_EMAIL}}".to_string()),
                    ("X-Team".to_string(), "${TEAM}".to_string()),
                ]),
                stream_rate: Some(10),
                ..Default::default()
            }],
            ..Default::default()
        };
        let env = EnvSettings::from_vars([("TEAM", "core")]);
        let request = ChatRequest::new(Endpoint::custom("litellm"), user()).with_model("m");

        let options = build(&request, &static_key("sk"), &endpoints, &env).unwrap();
        assert_eq!(options.headers["X-User"], "u@example.com");
        assert_eq!(options.headers["X-Team"], "core");
        assert_eq!(options.stream_rate, Some(10));
    }

    #[test]
    fn test_env_flags() {
        let env = EnvSettings::from_vars([
            (vars::OPENAI_SUMMARIZE, "true"),
            (vars::DEBUG_OPENAI, "true"),
            (vars::PROXY, "http://proxy:8080"),
        ]);
        let request = ChatRequest::new(Endpoint::OpenAI, user());
        let options = build(&request, &static_key("sk"), &EndpointsConfig::default(), &env).unwrap();
        assert_eq!(options.context_strategy, Some(ContextStrategy::Summarize));
        assert!(options.debug);
        assert_eq!(options.proxy.as_deref(), Some("http://proxy:8080"));

        let request = ChatRequest::new(Endpoint::Anthropic, user());
        let options = build(&request, &static_key("sk"), &EndpointsConfig::default(), &env).unwrap();
        assert_eq!(options.context_strategy, None);
    }

    #[test]
    fn test_missing_key_after_merge() {
        let request = ChatRequest::new(Endpoint::Google, user());
        let err = build(
            &request,
            &ResolvedCredentials::default(),
            &EndpointsConfig::default(),
            &EnvSettings::new(),
        )
        .unwrap_err();
        assert_eq!(err, ResolveError::MissingApiKey { endpoint: Endpoint::Google });
    }
}
