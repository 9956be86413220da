//! Gateway guardrails and validation of required guardrail names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A guardrail as listed by the gateway: either a bare name or an object
/// carrying `guardrail_name` plus arbitrary extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Guardrail {
    Name(String),
    Detailed {
        guardrail_name: String,
        #[serde(flatten)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
}

impl Guardrail {
    pub fn name(&self) -> &str {
        match self {
            Guardrail::Name(name) => name,
            Guardrail::Detailed { guardrail_name, .. } => guardrail_name,
        }
    }
}

/// `GET /guardrails/list` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardrailsResponse {
    #[serde(default)]
    pub guardrails: Vec<Guardrail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailValidation {
    pub is_valid: bool,
    pub invalid: Vec<String>,
}

/// Check that every required guardrail is offered by the gateway.
pub fn validate_required_guardrails(
    required: &[String],
    available: &[Guardrail],
) -> GuardrailValidation {
    let names: BTreeSet<&str> = available.iter().map(Guardrail::name).collect();
    let invalid: Vec<String> = required
        .iter()
        .filter(|name| !names.contains(name.as_str()))
        .cloned()
        .collect();

    GuardrailValidation {
        is_valid: invalid.is_empty(),
        invalid,
    }
}
