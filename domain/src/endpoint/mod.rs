//! Endpoint value object representing a provider family
//!
//! Requests name their endpoint by wire string (`openAI`, `azureOpenAI`, ...).
//! Everything that is not a built-in family is a named custom endpoint.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provider family a request is routed to (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    OpenAI,
    AzureOpenAI,
    Anthropic,
    Google,
    Bedrock,
    /// Named endpoint from the `custom` list (LiteLLM, Ollama, OpenRouter, ...)
    Custom(String),
}

impl Endpoint {
    /// Wire name of the endpoint
    pub fn as_str(&self) -> &str {
        match self {
            Endpoint::OpenAI => "openAI",
            Endpoint::AzureOpenAI => "azureOpenAI",
            Endpoint::Anthropic => "anthropic",
            Endpoint::Google => "google",
            Endpoint::Bedrock => "bedrock",
            Endpoint::Custom(name) => name,
        }
    }

    /// Build a custom endpoint, normalizing its configured name.
    pub fn custom(name: &str) -> Self {
        Endpoint::Custom(normalize_endpoint_name(name))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Endpoint::Custom(_))
    }

    /// Whether this endpoint fronts an LLM gateway (LiteLLM and friends).
    ///
    /// Gateway endpoints receive the caller's Authorization header when
    /// listing models.
    pub fn is_gateway(&self) -> bool {
        match self {
            Endpoint::Custom(name) => name.to_lowercase().contains("lite"),
            _ => false,
        }
    }

    /// Whether an OpenID bearer token must lose its `Bearer ` prefix before
    /// being used as this endpoint's API key.
    pub fn strips_bearer_prefix(&self) -> bool {
        matches!(self, Endpoint::Anthropic)
    }

    /// Whether this endpoint speaks the OpenAI wire format.
    pub fn is_openai_compatible(&self) -> bool {
        matches!(
            self,
            Endpoint::OpenAI | Endpoint::AzureOpenAI | Endpoint::Custom(_)
        )
    }
}

/// Normalize a configured custom endpoint name.
///
/// `Ollama` is matched case-insensitively so model listing can special-case it;
/// every other name is kept verbatim.
pub fn normalize_endpoint_name(name: &str) -> String {
    if name.eq_ignore_ascii_case("ollama") {
        "ollama".to_string()
    } else {
        name.to_string()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Endpoint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "openAI" => Endpoint::OpenAI,
            "azureOpenAI" => Endpoint::AzureOpenAI,
            "anthropic" => Endpoint::Anthropic,
            "google" => Endpoint::Google,
            "bedrock" => Endpoint::Bedrock,
            other => Endpoint::custom(other),
        })
    }
}

impl From<&str> for Endpoint {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(endpoint) => endpoint,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Endpoint::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roundtrip() {
        for endpoint in [
            Endpoint::OpenAI,
            Endpoint::AzureOpenAI,
            Endpoint::Anthropic,
            Endpoint::Google,
            Endpoint::Bedrock,
        ] {
            let parsed: Endpoint = endpoint.as_str().parse().unwrap();
            assert_eq!(parsed, endpoint);
        }
    }

    #[test]
    fn test_unknown_name_is_custom() {
        let endpoint = Endpoint::from("litellm");
        assert_eq!(endpoint, Endpoint::Custom("litellm".to_string()));
        assert!(endpoint.is_custom());
    }

    #[test]
    fn test_ollama_is_normalized() {
        assert_eq!(Endpoint::from("Ollama").as_str(), "ollama");
        assert_eq!(Endpoint::from("OpenRouter").as_str(), "OpenRouter");
    }

    #[test]
    fn test_gateway_detection() {
        assert!(Endpoint::from("LiteLLM").is_gateway());
        assert!(Endpoint::from("lite-proxy").is_gateway());
        assert!(!Endpoint::from("openrouter").is_gateway());
        assert!(!Endpoint::OpenAI.is_gateway());
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&Endpoint::AzureOpenAI).unwrap();
        assert_eq!(json, "\"azureOpenAI\"");
        let parsed: Endpoint = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(parsed, Endpoint::Anthropic);
    }
}
