//! Typed errors for the evaluation pipeline.
//!
//! The split matters for control flow: template and completion errors abort
//! the current record's annotation, parse failures are downgraded to sentinel
//! values upstream and never reach here, and config errors abort the whole run
//! before any record is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Prompt rendering failed. Fatal to that prompt-build call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template `{template}` is missing field `{field}`")]
    MissingField { template: String, field: String },

    #[error("template `{template}` has an unterminated placeholder")]
    UnterminatedPlaceholder { template: String },
}

/// A single provider call failed.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network/timeout/rate-limit/server conditions. The caller decides
    /// whether to retry; nothing here retries on its own.
    #[error("transient error from provider `{provider}`: {message}")]
    Transient {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Auth or invalid-request conditions. Aborts annotation of the current
    /// record only.
    #[error("fatal error from provider `{provider}`: {message}")]
    Fatal {
        provider: String,
        status: Option<u16>,
        message: String,
    },
}

impl CompletionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CompletionError::Transient { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            CompletionError::Transient { provider, .. }
            | CompletionError::Fatal { provider, .. } => provider,
        }
    }

    /// Map a transport-level reqwest failure. Timeouts and connection
    /// failures are worth retrying; anything else (request construction,
    /// body decode) is not.
    pub(crate) fn from_transport(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            CompletionError::Transient {
                provider: provider.to_string(),
                status: None,
                message: err.to_string(),
            }
        } else {
            CompletionError::Fatal {
                provider: provider.to_string(),
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }

    /// Map a non-success HTTP status. 408/429 and 5xx are transient; the
    /// remaining 4xx family (auth, invalid request) is fatal.
    pub(crate) fn from_status(provider: &str, status: u16, body: String) -> Self {
        let message = format!("HTTP {}: {}", status, body);
        if status == 408 || status == 429 || status >= 500 {
            CompletionError::Transient {
                provider: provider.to_string(),
                status: Some(status),
                message,
            }
        } else {
            CompletionError::Fatal {
                provider: provider.to_string(),
                status: Some(status),
                message,
            }
        }
    }

    pub(crate) fn malformed_response(provider: &str, detail: impl Into<String>) -> Self {
        CompletionError::Fatal {
            provider: provider.to_string(),
            status: None,
            message: format!("malformed response: {}", detail.into()),
        }
    }
}

/// Failure of one annotation stage (classification or rating).
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Configuration load/validation failure. Aborts the run at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("`{referent}` references unknown provider `{provider}`")]
    UnknownProvider { referent: String, provider: String },
}
