//! Domain error types

use crate::endpoint::Endpoint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Machine-readable error kind, surfaced to the UI so it can prompt the
/// user to re-enter a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingApiKey,
    MissingAuthHeader,
    UnknownModelGroup,
    ExpiredUserKey,
    NoUserKey,
    InvalidUserKey,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingApiKey => "missing_api_key",
            ErrorKind::MissingAuthHeader => "missing_auth_header",
            ErrorKind::UnknownModelGroup => "unknown_model_group",
            ErrorKind::ExpiredUserKey => "expired_user_key",
            ErrorKind::NoUserKey => "no_user_key",
            ErrorKind::InvalidUserKey => "invalid_user_key",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential and configuration resolution errors.
///
/// These are never retried; they propagate to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("{endpoint} API key not provided")]
    MissingApiKey { endpoint: Endpoint },

    #[error("{endpoint} authorization header not provided for OpenID authentication")]
    MissingAuthHeader { endpoint: Endpoint },

    #[error("model '{model}' is not mapped to any Azure model group")]
    UnknownModelGroup { model: String },

    #[error("user key for {endpoint} expired at {expired_at}")]
    ExpiredUserKey {
        endpoint: Endpoint,
        expired_at: DateTime<Utc>,
    },

    #[error("no user key stored for {endpoint}, please provide it again")]
    NoUserKey { endpoint: Endpoint },

    #[error("stored user key for {endpoint} is invalid: {reason}")]
    InvalidUserKey { endpoint: Endpoint, reason: String },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::MissingApiKey { .. } => ErrorKind::MissingApiKey,
            ResolveError::MissingAuthHeader { .. } => ErrorKind::MissingAuthHeader,
            ResolveError::UnknownModelGroup { .. } => ErrorKind::UnknownModelGroup,
            ResolveError::ExpiredUserKey { .. } => ErrorKind::ExpiredUserKey,
            ResolveError::NoUserKey { .. } => ErrorKind::NoUserKey,
            ResolveError::InvalidUserKey { .. } => ErrorKind::InvalidUserKey,
        }
    }

    /// Whether the user can fix this by entering a (new) key.
    pub fn requires_user_key(&self) -> bool {
        matches!(
            self,
            ResolveError::ExpiredUserKey { .. }
                | ResolveError::NoUserKey { .. }
                | ResolveError::InvalidUserKey { .. }
        )
    }

    /// JSON payload handed to the UI: `{"type": <kind>, ...}`.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            ResolveError::ExpiredUserKey {
                endpoint,
                expired_at,
            } => json!({
                "type": self.kind(),
                "endpoint": endpoint,
                "expiredAt": expired_at.to_rfc3339(),
            }),
            ResolveError::UnknownModelGroup { model } => json!({
                "type": self.kind(),
                "model": model,
            }),
            ResolveError::MissingApiKey { endpoint }
            | ResolveError::MissingAuthHeader { endpoint }
            | ResolveError::NoUserKey { endpoint }
            | ResolveError::InvalidUserKey { endpoint, .. } => json!({
                "type": self.kind(),
                "endpoint": endpoint,
            }),
        }
    }
}
