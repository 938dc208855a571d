//! Error types for the header scanner

use thiserror::Error;

/// Main error type for headersec operations
#[derive(Debug, Error)]
pub enum HeaderSecError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid URL ({target:?}): {reason}")]
    InvalidUrl { target: String, reason: String },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request failed ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET fallback failed ({url}): {source}")]
    FallbackFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to save JSON file ({path}): {source}")]
    JsonWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for headersec operations
pub type Result<T> = std::result::Result<T, HeaderSecError>;
