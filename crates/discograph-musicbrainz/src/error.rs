// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// The failure taxonomy every adapter in this service reports through (§4.1).
/// The job queue uses the tag to decide whether a failed attempt counts
/// against `max_attempts`: `Transient` should be retried, `Permanent` should
/// not.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Authoritative absence (HTTP 404 or an explicit not-found body).
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials or permissions problem (HTTP 403, or a provider-specific
    /// "invalid API key" response).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Connection reset, timeout, HTTP 5xx, or HTTP 429 — worth retrying.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Anything else: malformed response, invalid content-type, a client bug.
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl AdapterError {
    pub fn from_status(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        if status == reqwest::StatusCode::NOT_FOUND {
            Self::NotFound(body)
        } else if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            Self::Forbidden(body)
        } else if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::Transient(format!("HTTP {}: {}", status, body))
        } else {
            Self::Permanent(format!("HTTP {}: {}", status, body))
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Transient(err.to_string())
        } else {
            Self::Permanent(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Permanent(format!("failed to parse response: {}", err))
    }
}
