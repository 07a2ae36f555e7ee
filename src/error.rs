// src/error.rs

//! Unified error handling for the catalog crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
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

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Browser automation step failed
    #[error("Automation error during {action} on '{target}': {message}")]
    Automation {
        action: String,
        target: String,
        message: String,
    },

    /// A required program field could not be extracted
    #[error("Extraction error for field '{field}': {message}")]
    Extraction { field: String, message: String },

    /// Document transfer failed
    #[error("Transfer error for {url}: {message}")]
    Transfer { url: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an automation error for a failed browser action.
    pub fn automation(
        action: impl Into<String>,
        target: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Automation {
            action: action.into(),
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error for a required field.
    pub fn extraction(field: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Create a transfer error.
    pub fn transfer(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transfer {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
