// src/error.rs

//! Unified error handling for the mirror index.

use std::fmt;

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Listing retrieval error for a single mirror
    #[error("Fetch error for {mirror} ({url}): {message}")]
    Fetch {
        mirror: String,
        url: String,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with mirror context.
    pub fn fetch(
        mirror: impl Into<String>,
        url: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Fetch {
            mirror: mirror.into(),
            url: url.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_mirror_and_url() {
        let err = AppError::fetch("mirror-a", "https://a.example/list", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "Fetch error for mirror-a (https://a.example/list): HTTP 503"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
