// src/error.rs

//! Unified error handling for the listing watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching the announcement source failed (transport or non-2xx)
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Source document structure was not recognised
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading or writing the known-identifier object failed
    #[error("Store error at {location}: {message}")]
    Store { location: String, message: String },

    /// Posting a single alert to the webhook failed
    #[error("Notify error for {id}: {message}")]
    Notify { id: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a network error for the given URL.
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a store error for the given object location.
    pub fn store(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a notify error for the given announcement.
    pub fn notify(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Short machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } | Self::Http(_) => "network_failure",
            Self::Parse(_) => "parse_failure",
            Self::Store { .. } => "store_failure",
            Self::Notify { .. } => "notify_failure",
            Self::Config(_) | Self::Toml(_) | Self::Url(_) => "config_error",
            Self::Io(_) | Self::Json(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::store("s3://bucket/ids.json", "access denied");
        assert_eq!(
            err.to_string(),
            "Store error at s3://bucket/ids.json: access denied"
        );
        assert_eq!(err.kind(), "store_failure");
    }

    #[test]
    fn test_kind_for_network() {
        let err = AppError::network("https://example.com", "status 503");
        assert_eq!(err.kind(), "network_failure");
    }
}
