//! Output formatter trait

use super::ConfigSourceLine;
use chatrelay_application::{CredentialError, LoadReport};
use chatrelay_domain::{
    AnthropicConfig, ClientOptions, ConfigIssue, Guardrail, GuardrailValidation, ModelCatalog,
    RunLlmConfig,
};

/// Trait for formatting command results
///
/// Callers redact secrets before handing options to a formatter.
pub trait OutputFormatter {
    fn catalog(&self, catalog: &ModelCatalog, report: Option<&LoadReport>) -> String;

    fn client_options(&self, options: &ClientOptions) -> String;

    fn anthropic(&self, config: &AnthropicConfig) -> String;

    fn run_config(&self, config: &RunLlmConfig) -> String;

    fn guardrails(&self, guardrails: &[Guardrail]) -> String;

    fn guardrail_validation(&self, validation: &GuardrailValidation) -> String;

    fn config_sources(&self, sources: &[ConfigSourceLine], issues: &[ConfigIssue]) -> String;

    fn credential_error(&self, error: &CredentialError) -> String;
}
