use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// The same failure taxonomy the canonical adapter reports through, applied
/// here to the text and artwork providers so the job queue can decide
/// retryability without knowing which provider a job targeted.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("transient failure: {0}")]
    Transient(String),

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

impl From<crate::lastfm::LastFmError> for AdapterError {
    fn from(err: crate::lastfm::LastFmError) -> Self {
        use crate::lastfm::LastFmError;
        match err {
            LastFmError::Http(e) => e.into(),
            LastFmError::Deserialization(e) => e.into(),
            LastFmError::RateLimiterClosed => Self::Permanent("rate limiter closed".to_string()),
        }
    }
}

impl From<crate::discogs::DiscogsError> for AdapterError {
    fn from(err: crate::discogs::DiscogsError) -> Self {
        use crate::discogs::DiscogsError;
        match err {
            DiscogsError::Http(e) => e.into(),
            DiscogsError::HttpStatus { status, body } => Self::from_status(status, body),
            DiscogsError::Api { message } => Self::Permanent(message),
            DiscogsError::Deserialization(e) => e.into(),
            DiscogsError::MissingField(field) => {
                Self::Permanent(format!("missing expected field: {field}"))
            }
            DiscogsError::RateLimiterClosed => Self::Permanent("rate limiter closed".to_string()),
        }
    }
}

impl From<crate::fanarttv::FanartTvError> for AdapterError {
    fn from(err: crate::fanarttv::FanartTvError) -> Self {
        use crate::fanarttv::FanartTvError;
        match err {
            FanartTvError::Http(e) => e.into(),
            FanartTvError::HttpStatus { status, body } => Self::from_status(status, body),
            FanartTvError::Api { message } => Self::Permanent(message),
            FanartTvError::Deserialization(e) => e.into(),
            FanartTvError::RateLimiterClosed => Self::Permanent("rate limiter closed".to_string()),
        }
    }
}

impl From<crate::cover_art_fallback::CoverArtFallbackError> for AdapterError {
    fn from(err: crate::cover_art_fallback::CoverArtFallbackError) -> Self {
        use crate::cover_art_fallback::CoverArtFallbackError;
        match err {
            CoverArtFallbackError::NoArtworkFound => {
                Self::NotFound("no artwork found from configured providers".to_string())
            }
            CoverArtFallbackError::ProvidersFailed(errors) => Self::Transient(format!(
                "all cover-art providers failed: {}",
                errors
                    .iter()
                    .map(|e| format!("{:?}: {}", e.provider, e.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            )),
            CoverArtFallbackError::RateLimiterClosed => {
                Self::Permanent("rate limiter closed".to_string())
            }
        }
    }
}
