// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;

use thiserror::Error;

/// Result type alias for digest operations.
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

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// XML tokenizer rejected the document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML was tokenized but the document structure is broken
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Post composition error
    #[error("Compose error: {0}")]
    Compose(String),

    /// The publishing service rejected a request
    #[error("Publish error ({status}): {message}")]
    Publish { status: u16, message: String },
}

impl AppError {
    /// Create a malformed XML error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a compose error.
    pub fn compose(message: impl Into<String>) -> Self {
        Self::Compose(message.into())
    }

    /// Create a publish error from an HTTP status and response detail.
    pub fn publish(status: u16, message: impl fmt::Display) -> Self {
        Self::Publish {
            status,
            message: message.to_string(),
        }
    }

    /// Whether the error came from a broken document rather than transport.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Xml(_) | Self::Malformed(_))
    }
}
