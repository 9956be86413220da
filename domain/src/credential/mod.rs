//! Credential sources and resolution
//!
//! An endpoint's credential is either a static value from the environment,
//! a key the user stored themselves (`user_provided`), or the caller's own
//! bearer token forwarded upstream (`openid`).

use crate::core::error::ResolveError;
use crate::core::string::{non_empty, strip_bearer};
use crate::endpoint::Endpoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker value for credentials the end user supplies.
pub const USER_PROVIDED: &str = "user_provided";
/// Marker value for forwarding the caller's bearer token.
pub const OPENID: &str = "openid";

/// Where an endpoint's API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Static(String),
    UserProvided,
    OpenId,
    Missing,
}

impl CredentialSource {
    pub fn parse(value: Option<&str>) -> Self {
        match non_empty(value) {
            None => CredentialSource::Missing,
            Some(USER_PROVIDED) => CredentialSource::UserProvided,
            Some(OPENID) => CredentialSource::OpenId,
            Some(v) => CredentialSource::Static(v.to_string()),
        }
    }
}

pub fn is_user_provided(value: Option<&str>) -> bool {
    value == Some(USER_PROVIDED)
}

/// Values a user stored for one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeyValues {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Reject a stored user key whose expiry lies in the past.
pub fn check_user_key_expiry(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    endpoint: &Endpoint,
) -> Result<(), ResolveError> {
    if expires_at < now {
        return Err(ResolveError::ExpiredUserKey {
            endpoint: endpoint.clone(),
            expired_at: expires_at,
        });
    }
    Ok(())
}

/// Inputs to credential resolution for one request.
#[derive(Debug, Clone)]
pub struct CredentialInput<'a> {
    pub endpoint: &'a Endpoint,
    pub user_id: &'a str,
    /// Raw `Authorization` header of the inbound request.
    pub authorization: Option<&'a str>,
    /// Expiry of the user's stored key, as sent by the client.
    pub expires_at: Option<DateTime<Utc>>,
    /// Configured credential: a key, `user_provided`, or `openid`.
    pub credential: Option<&'a str>,
    /// Configured base URL override: a URL or `user_provided`.
    pub base_url: Option<&'a str>,
    /// Endpoint default base URL from the app configuration.
    pub default_base_url: Option<&'a str>,
    /// Gateway URL used when nothing else resolves.
    pub gateway_url: Option<&'a str>,
    /// The key comes from elsewhere (an Azure group), so a missing key is
    /// not an error at this stage.
    pub key_supplied_by_config: bool,
}

impl CredentialInput<'_> {
    pub fn source(&self) -> CredentialSource {
        CredentialSource::parse(self.credential)
    }

    /// Whether the user's stored values are needed.
    pub fn needs_user_values(&self) -> bool {
        self.source() == CredentialSource::UserProvided || is_user_provided(self.base_url)
    }
}

/// Outcome of credential resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Header forwarded verbatim when OpenID passthrough is active.
    pub auth_header: Option<String>,
    pub use_openid: bool,
    pub user_provides_key: bool,
}

/// Resolve API key and base URL once the user's stored values are known.
///
/// Base URL precedence: user-provided URL > configured override > endpoint
/// default > gateway URL.
pub fn resolve_credentials(
    input: &CredentialInput<'_>,
    user_values: Option<&UserKeyValues>,
) -> Result<ResolvedCredentials, ResolveError> {
    let source = input.source();
    let authorization = non_empty(input.authorization);
    let endpoint = input.endpoint;

    let api_key = match &source {
        CredentialSource::Static(key) => Some(key.clone()),
        CredentialSource::UserProvided => user_values
            .and_then(|v| non_empty(v.api_key.as_deref()))
            .map(str::to_string),
        CredentialSource::OpenId => authorization.map(|header| {
            if endpoint.strips_bearer_prefix() {
                strip_bearer(header).to_string()
            } else {
                header.to_string()
            }
        }),
        CredentialSource::Missing => None,
    };

    let base_url = if is_user_provided(input.base_url) {
        user_values.and_then(|v| non_empty(v.base_url.as_deref()))
    } else {
        non_empty(input.base_url).or(non_empty(input.default_base_url))
    }
    .or(non_empty(input.gateway_url))
    .map(str::to_string);

    let use_openid = source == CredentialSource::OpenId;
    if use_openid && authorization.is_none() {
        return Err(ResolveError::MissingAuthHeader {
            endpoint: endpoint.clone(),
        });
    }

    if !input.key_supplied_by_config && api_key.is_none() {
        return Err(match source {
            CredentialSource::UserProvided => ResolveError::NoUserKey {
                endpoint: endpoint.clone(),
            },
            _ => ResolveError::MissingApiKey {
                endpoint: endpoint.clone(),
            },
        });
    }

    Ok(ResolvedCredentials {
        api_key,
        base_url,
        auth_header: use_openid.then(|| authorization.map(str::to_string)).flatten(),
        use_openid,
        user_provides_key: source == CredentialSource::UserProvided,
    })
}
