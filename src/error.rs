//! Error types shared by the upstream API clients.

use thiserror::Error;

/// Errors raised while talking to an upstream service (language model,
/// BoardGameGeek, Spotify).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("{service} API error ({status}): {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The upstream body could not be decoded.
    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// The upstream body decoded but lacked the expected shape.
    #[error("Invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    /// A request URL could not be built from the configured base.
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The requested entity does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required credentials are not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
}

impl ClientError {
    pub fn decode(service: &'static str, message: impl ToString) -> Self {
        Self::Decode {
            service,
            message: message.to_string(),
        }
    }

    pub fn invalid(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Whether a retry could plausibly succeed (rate limit, 5xx, transport).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised while loading [`crate::config::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
