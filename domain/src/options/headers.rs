//! Header template resolution.
//!
//! Configured header values may reference the calling user
//! (`{{LIBRECHAT_USER_ID}}`, `{{LIBRECHAT_USER_EMAIL}}`,
//! `{{LIBRECHAT_USER_NAME}}`) and environment variables (`${VAR}`).

use crate::config::EnvSettings;
use crate::request::RequestUser;
use std::collections::BTreeMap;

pub const USER_ID_PLACEHOLDER: &str = "{{LIBRECHAT_USER_ID}}";
pub const USER_EMAIL_PLACEHOLDER: &str = "{{LIBRECHAT_USER_EMAIL}}";
pub const USER_NAME_PLACEHOLDER: &str = "{{LIBRECHAT_USER_NAME}}";

/// Resolve every placeholder in `headers`.
///
/// User placeholders whose field is unknown are replaced by an empty string;
/// unknown environment variables are left as written.
pub fn resolve_headers(
    headers: &BTreeMap<String, String>,
    user: Option<&RequestUser>,
    env: &EnvSettings,
) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| (name.clone(), resolve_header_value(value, user, env)))
        .collect()
}

fn resolve_header_value(value: &str, user: Option<&RequestUser>, env: &EnvSettings) -> String {
    let mut resolved = value.to_string();
    if let Some(user) = user {
        resolved = resolved
            .replace(USER_ID_PLACEHOLDER, &user.id)
            .replace(USER_EMAIL_PLACEHOLDER, user.email.as_deref().unwrap_or_default())
            .replace(USER_NAME_PLACEHOLDER, user.name.as_deref().unwrap_or_default());
    }
    env.expand(&resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_user_placeholders() {
        let user = RequestUser::new("u-42").with_email("dev@example.com");
        let resolved = resolve_headers(
            &headers(&[
                ("X-User-Id", "{{LIBRECHAT_USER_ID}}"),
                ("X-User", "{{LIBRECHAT_USER_EMAIL}}/{{LIBRECHAT_USER_NAME}}"),
            ]),
            Some(&user),
            &EnvSettings::new(),
        );
        assert_eq!(resolved["X-User-Id"], "u-42");
        assert_eq!(resolved["X-User"], "dev@example.com/");
    }

    #[test]
    fn test_env_placeholders() {
        let env = EnvSettings::from_vars([("PORTKEY_KEY", "pk-1")]);
        let resolved = resolve_headers(
            &headers(&[("x-portkey-api-key", "${PORTKEY_KEY}"), ("x-other", "${NOPE}")]),
            None,
            &env,
        );
        assert_eq!(resolved["x-portkey-api-key"], "pk-1");
        assert_eq!(resolved["x-other"], "${NOPE}");
    }

    #[test]
    fn test_without_user_leaves_user_placeholders() {
        let resolved = resolve_headers(
            &headers(&[("X-User-Id", "{{LIBRECHAT_USER_ID}}")]),
            None,
            &EnvSettings::new(),
        );
        assert_eq!(resolved["X-User-Id"], "{{LIBRECHAT_USER_ID}}");
    }
}
