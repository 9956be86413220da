//! Configuration issues reported while loading endpoint settings.
//!
//! Loading never fails on these; they are returned so the caller can log
//! them or refuse to start on [`Severity::Error`].

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the affected endpoint cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A custom endpoint has no name.
    EmptyEndpointName,
    /// A custom endpoint lacks a field required to list or call models.
    MissingCustomField { endpoint: String, field: String },
    /// Two Azure groups claim the same model; the first one wins.
    DuplicateAzureModel { model: String, group: String },
    /// Two Azure groups share a name; only the first definition is used.
    DuplicateAzureGroup { group: String },
    /// An Azure group lists no models.
    EmptyAzureGroup { group: String },
    /// A non-serverless Azure group has no instance name.
    MissingAzureInstance { group: String },
    /// A serverless Azure group has no base URL.
    MissingServerlessBaseUrl { group: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Check whether any issues are errors (i.e. fatal).
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}
