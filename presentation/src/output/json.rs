//! JSON output formatter

use super::ConfigSourceLine;
use super::formatter::OutputFormatter;
use chatrelay_application::{CredentialError, LoadReport};
use chatrelay_domain::{
    AnthropicConfig, ClientOptions, ConfigIssue, Guardrail, GuardrailValidation, ModelCatalog,
    RunLlmConfig, Severity,
};
use serde::Serialize;
use serde_json::{Value, json};

/// Formats command results as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn issue(issue: &ConfigIssue) -> Value {
        let severity = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        json!({ "severity": severity, "message": issue.message })
    }
}

impl OutputFormatter for JsonFormatter {
    fn catalog(&self, catalog: &ModelCatalog, report: Option<&LoadReport>) -> String {
        match report {
            Some(report) => Self::render(&json!({ "models": catalog, "report": report })),
            None => Self::render(catalog),
        }
    }

    fn client_options(&self, options: &ClientOptions) -> String {
        Self::render(options)
    }

    fn anthropic(&self, config: &AnthropicConfig) -> String {
        Self::render(config)
    }

    fn run_config(&self, config: &RunLlmConfig) -> String {
        Self::render(config)
    }

    fn guardrails(&self, guardrails: &[Guardrail]) -> String {
        Self::render(&json!({ "guardrails": guardrails }))
    }

    fn guardrail_validation(&self, validation: &GuardrailValidation) -> String {
        Self::render(&json!({
            "isValid": validation.is_valid,
            "invalidGuardrails": validation.invalid,
        }))
    }

    fn config_sources(&self, sources: &[ConfigSourceLine], issues: &[ConfigIssue]) -> String {
        let issues: Vec<Value> = issues.iter().map(Self::issue).collect();
        Self::render(&json!({ "sources": sources, "issues": issues }))
    }

    fn credential_error(&self, error: &CredentialError) -> String {
        let payload = match error {
            CredentialError::Resolve(e) => e.to_payload(),
            other => json!({ "type": "error", "message": other.to_string() }),
        };
        Self::render(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_domain::{ConfigIssueCode, Endpoint, ResolveError};

    #[test]
    fn test_catalog_with_report() {
        let mut catalog = ModelCatalog::new();
        catalog.insert(&Endpoint::OpenAI, vec!["gpt-4o".to_string()]);
        let report = LoadReport {
            cache_hit: true,
            ..Default::default()
        };

        let plain: Value = serde_json::from_str(&JsonFormatter.catalog(&catalog, None)).unwrap();
        assert_eq!(plain, json!({"openAI": ["gpt-4o"]}));

        let with_report: Value =
            serde_json::from_str(&JsonFormatter.catalog(&catalog, Some(&report))).unwrap();
        assert_eq!(with_report["report"]["cache_hit"], true);
        assert_eq!(with_report["models"]["openAI"][0], "gpt-4o");
    }

    #[test]
    fn test_credential_error_payload() {
        let error = CredentialError::Resolve(ResolveError::NoUserKey {
            endpoint: Endpoint::OpenAI,
        });
        let payload: Value = serde_json::from_str(&JsonFormatter.credential_error(&error)).unwrap();
        assert_eq!(payload["type"], "no_user_key");

        let error = CredentialError::UnknownEndpoint("nope".to_string());
        let payload: Value = serde_json::from_str(&JsonFormatter.credential_error(&error)).unwrap();
        assert_eq!(payload["type"], "error");
    }

    #[test]
    fn test_config_sources() {
        let sources = vec![ConfigSourceLine {
            kind: "project".to_string(),
            location: "./chatrelay.toml".to_string(),
            found: true,
        }];
        let issues = vec![ConfigIssue::error(ConfigIssueCode::EmptyEndpointName, "no name")];
        let value: Value =
            serde_json::from_str(&JsonFormatter.config_sources(&sources, &issues)).unwrap();
        assert_eq!(value["sources"][0]["found"], true);
        assert_eq!(value["issues"][0]["severity"], "error");
    }
}
