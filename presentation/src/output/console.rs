//! Console output formatter

use super::ConfigSourceLine;
use super::formatter::OutputFormatter;
use chatrelay_application::{CredentialError, FetchState, LoadReport};
use chatrelay_domain::{
    AnthropicConfig, ClientOptions, ConfigIssue, Guardrail, GuardrailValidation, ModelCatalog,
    RunLlmConfig, Severity,
};
use colored::Colorize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        format!("{}\n", format!("=== {} ===", title).cyan().bold())
    }

    fn field(output: &mut String, label: &str, value: impl std::fmt::Display) {
        output.push_str(&format!("  {:<20} {}\n", format!("{}:", label).bold(), value));
    }

    fn opt_field(output: &mut String, label: &str, value: Option<&str>) {
        if let Some(value) = value {
            Self::field(output, label, value);
        }
    }

    fn map_section(output: &mut String, title: &str, map: &BTreeMap<String, String>) {
        if map.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", title.yellow().bold()));
        for (key, value) in map {
            output.push_str(&format!("  {} = {}\n", key, value));
        }
    }

    fn params_section(output: &mut String, title: &str, params: &Map<String, Value>) {
        if params.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", title.yellow().bold()));
        for (key, value) in params {
            output.push_str(&format!("  {} = {}\n", key, value));
        }
    }

    fn fetch_state(state: &FetchState) -> String {
        match state {
            FetchState::Pending => "pending".dimmed().to_string(),
            FetchState::Fetching => "fetching".dimmed().to_string(),
            FetchState::Resolved { models } => format!("{} models", models).green().to_string(),
            FetchState::FailedFallback { reason } => {
                format!("fallback ({})", reason).yellow().to_string()
            }
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn catalog(&self, catalog: &ModelCatalog, report: Option<&LoadReport>) -> String {
        let mut output = Self::header("Model Catalog");

        if catalog.endpoints.is_empty() {
            output.push_str(&format!("  {}\n", "No models available".dimmed()));
        }
        for (endpoint, models) in &catalog.endpoints {
            output.push_str(&format!(
                "\n{} {}\n",
                endpoint.yellow().bold(),
                format!("({})", models.len()).dimmed()
            ));
            for model in models {
                match catalog.provider_of(model) {
                    Some(provider) => {
                        output.push_str(&format!("  * {} {}\n", model, format!("[{}]", provider).dimmed()))
                    }
                    None => output.push_str(&format!("  * {}\n", model)),
                }
            }
        }

        if let Some(report) = report {
            output.push_str(&format!("\n{}\n", "Load report:".cyan().bold()));
            Self::field(&mut output, "Cache hit", report.cache_hit);
            Self::field(&mut output, "LiteLLM", report.from_gateway);
            for fetch in &report.fetches {
                output.push_str(&format!(
                    "  {} [{}] {}\n",
                    fetch.base_url,
                    fetch.endpoints.join(", "),
                    Self::fetch_state(&fetch.state)
                ));
            }
        }

        output
    }

    fn client_options(&self, options: &ClientOptions) -> String {
        let mut output = Self::header("Client Options");
        Self::opt_field(&mut output, "Model", options.model());
        Self::opt_field(&mut output, "API key", options.api_key.as_deref());
        Self::opt_field(&mut output, "Base URL", options.reverse_proxy_url.as_deref());
        Self::opt_field(&mut output, "Auth header", options.auth_header.as_deref());
        Self::opt_field(&mut output, "Proxy", options.proxy.as_deref());
        if let Some(rate) = options.stream_rate {
            Self::field(&mut output, "Stream rate", format!("{} ms", rate));
        }
        Self::opt_field(&mut output, "Title model", options.title_model.as_deref());
        Self::opt_field(&mut output, "Title method", options.title_method.as_deref());
        if options.debug {
            Self::field(&mut output, "Debug", "on");
        }
        if options.context_strategy.is_some() {
            Self::field(&mut output, "Context strategy", "summarize");
        }

        if let Some(azure) = &options.azure {
            output.push_str(&format!("\n{}\n", "Azure".yellow().bold()));
            Self::opt_field(&mut output, "Instance", azure.instance_name.as_deref());
            Self::opt_field(&mut output, "Deployment", azure.deployment_name.as_deref());
            Self::opt_field(&mut output, "API version", azure.api_version.as_deref());
        }

        Self::map_section(&mut output, "Headers", &options.headers);
        Self::map_section(&mut output, "Query", &options.default_query);
        Self::params_section(&mut output, "Model options", &options.model_options);
        output
    }

    fn anthropic(&self, config: &AnthropicConfig) -> String {
        let llm = &config.llm_config;
        let mut output = Self::header("Anthropic Client");
        Self::field(&mut output, "Model", &llm.model);
        Self::opt_field(&mut output, "API key", llm.api_key.as_deref());
        Self::opt_field(&mut output, "Base URL", llm.base_url.as_deref());
        Self::field(&mut output, "Max tokens", llm.max_tokens);
        Self::field(&mut output, "Stream", llm.stream);
        if let Some(thinking) = &llm.thinking {
            Self::field(&mut output, "Thinking budget", thinking.budget_tokens);
        }
        if let Some(t) = llm.temperature {
            Self::field(&mut output, "Temperature", t);
        }
        if let Some(p) = llm.top_p {
            Self::field(&mut output, "Top P", p);
        }
        if let Some(k) = llm.top_k {
            Self::field(&mut output, "Top K", k);
        }
        Self::map_section(&mut output, "Headers", &llm.default_headers);
        if !config.tools.is_empty() {
            output.push_str(&format!("\n{}\n", "Tools".yellow().bold()));
            for tool in &config.tools {
                output.push_str(&format!("  * {} ({})\n", tool.name, tool.kind));
            }
        }
        output
    }

    fn run_config(&self, config: &RunLlmConfig) -> String {
        let mut output = Self::header("Run Configuration");
        Self::field(&mut output, "Provider", &config.provider);
        Self::field(&mut output, "Streaming", config.streaming);
        Self::field(&mut output, "Stream usage", config.stream_usage);
        if config.usage {
            Self::field(&mut output, "Usage", true);
        }
        Self::field(&mut output, "Reasoning key", config.reasoning_key.as_str());
        Self::params_section(&mut output, "Model parameters", &config.model_parameters);
        output
    }

    fn guardrails(&self, guardrails: &[Guardrail]) -> String {
        let mut output = Self::header("Guardrails");
        if guardrails.is_empty() {
            output.push_str(&format!("  {}\n", "None offered".dimmed()));
        }
        for guardrail in guardrails {
            output.push_str(&format!("  * {}\n", guardrail.name()));
        }
        output
    }

    fn guardrail_validation(&self, validation: &GuardrailValidation) -> String {
        if validation.is_valid {
            return format!("{}\n", "All required guardrails are available".green().bold());
        }
        let mut output = format!("{}\n", "Missing required guardrails:".red().bold());
        for name in &validation.invalid {
            output.push_str(&format!("  * {}\n", name));
        }
        output
    }

    fn config_sources(&self, sources: &[ConfigSourceLine], issues: &[ConfigIssue]) -> String {
        let mut output = String::from("Configuration sources (in priority order):\n");
        for source in sources {
            let marker = if source.found { "[FOUND]" } else { "[     ]" };
            output.push_str(&format!(
                "  {} {:<12} {}\n",
                marker,
                format!("{}:", source.kind),
                source.location
            ));
        }

        if !issues.is_empty() {
            output.push_str(&format!("\n{}\n", "Configuration issues:".bold()));
            for issue in issues {
                let label = match issue.severity {
                    Severity::Error => "error".red().bold(),
                    Severity::Warning => "warning".yellow().bold(),
                };
                output.push_str(&format!("  {}: {}\n", label, issue.message));
            }
        }
        output
    }

    fn credential_error(&self, error: &CredentialError) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error);
        if let Some(kind) = error.kind() {
            output.push_str(&format!("  {} {}\n", "kind:".dimmed(), kind));
        }
        if let CredentialError::Resolve(e) = error
            && e.requires_user_key()
        {
            output.push_str("  Provide the key again to continue.\n");
        }
        output
    }
}
