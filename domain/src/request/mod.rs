//! Inbound chat request as seen by the resolution layer.

use crate::endpoint::Endpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated caller of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl RequestUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A chat request routed to one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub endpoint: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub model_parameters: Map<String, Value>,
    /// Expiry of the user's stored key, sent by the client as `key`.
    #[serde(rename = "key", default, skip_serializing_if = "Option::is_none")]
    pub key_expires_at: Option<DateTime<Utc>>,
    /// Raw `Authorization` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    pub user: RequestUser,
}

impl ChatRequest {
    pub fn new(endpoint: Endpoint, user: RequestUser) -> Self {
        Self {
            endpoint,
            model: None,
            model_parameters: Map::new(),
            key_expires_at: None,
            authorization: None,
            user,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.model_parameters.insert(key.into(), value);
        self
    }

    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    pub fn with_key_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.key_expires_at = Some(expires_at);
        self
    }

    /// Model the request targets.
    ///
    /// `override_model` beats `model_parameters.model`, which beats the
    /// top-level `model`.
    pub fn effective_model<'a>(&'a self, override_model: Option<&'a str>) -> Option<&'a str> {
        override_model
            .or_else(|| self.model_parameters.get("model").and_then(Value::as_str))
            .or(self.model.as_deref())
            .filter(|m| !m.is_empty())
    }
}
