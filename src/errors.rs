use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Error body returned by the storefront backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level validation messages keyed by field name
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    /// Flattens the body into one line: the message followed by field errors.
    pub fn summary(&self) -> Option<String> {
        let fields = self
            .errors
            .as_ref()
            .map(|errors| {
                errors
                    .iter()
                    .flat_map(|(field, messages)| {
                        messages.iter().map(move |m| format!("{}: {}", field, m))
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        match (self.message.as_deref(), fields.is_empty()) {
            (Some(message), true) => Some(message.to_string()),
            (Some(message), false) => Some(format!("{} ({})", message, fields.join("; "))),
            (None, false) => Some(fields.join("; ")),
            (None, true) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::StorageError(err.to_string())
    }
}

impl From<url::ParseError> for ServiceError {
    fn from(err: url::ParseError) -> Self {
        ServiceError::ConfigError(format!("invalid URL: {}", err))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            ServiceError::SerializationError(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::from_status(status, None)
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl ServiceError {
    /// Maps a non-success HTTP status and its optional body onto an error.
    /// This is the single place where backend status codes are interpreted.
    pub fn from_status(status: StatusCode, body: Option<ErrorResponse>) -> Self {
        let message = body
            .and_then(|b| b.summary())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected response")
                    .to_string()
            });

        match status {
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ServiceError::ValidationError(message)
            }
            StatusCode::UNAUTHORIZED => ServiceError::Unauthorized(message),
            StatusCode::FORBIDDEN => ServiceError::Forbidden(message),
            StatusCode::CONFLICT => ServiceError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimitExceeded,
            _ => ServiceError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Message rendered in the inline alert banner.
    /// Transport and internal failures collapse to generic text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the server. Check your connection.".to_string(),
            Self::Timeout(_) => "The server took too long to respond.".to_string(),
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::InvalidOperation(msg) => msg.clone(),
            Self::RateLimitExceeded => "Too many requests, please slow down.".to_string(),
            Self::ApiError { status, message } if *status < 500 => message.clone(),
            Self::ApiError { .. } => "Something went wrong on our side.".to_string(),
            Self::SerializationError(_)
            | Self::StorageError(_)
            | Self::ConfigError(_)
            | Self::Other(_) => "Unexpected error".to_string(),
        }
    }

    /// Whether re-dispatching the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimitExceeded => true,
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
