//! Error types for ScholarGraph
//!
//! Provides the shared error taxonomy with:
//! - Distinct error types for fetch, storage, and graph failures
//! - Machine-readable error codes
//! - A retry classifier the fetcher uses to pick out rate-limited pages

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,

    // Upstream API errors (6xxx)
    RateLimited,
    UpstreamError,

    // Graph store errors (7xxx)
    GraphQueryError,
    GraphConnectionError,
    RowDecodeError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    StorageError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::RateLimited => 6001,
            ErrorCode::UpstreamError => 6002,

            ErrorCode::GraphQueryError => 7001,
            ErrorCode::GraphConnectionError => 7002,
            ErrorCode::RowDecodeError => 7003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::StorageError => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Upstream API errors
    #[error("Rate limited by upstream API")]
    RateLimited,

    #[error("Upstream API error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Graph store errors
    #[error("Graph query {query} failed: {message}")]
    GraphQuery { query: String, message: String },

    #[error("Graph store connection error: {message}")]
    GraphConnection { message: String },

    #[error("Failed to decode row for {query}: {message}")]
    RowDecode { query: String, message: String },

    // Storage errors
    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::GraphQuery { .. } => ErrorCode::GraphQueryError,
            AppError::GraphConnection { .. } => ErrorCode::GraphConnectionError,
            AppError::RowDecode { .. } => ErrorCode::RowDecodeError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether repeating the failed operation can succeed.
    ///
    /// Only upstream rate limiting qualifies. Graph queries are never
    /// retried: the store is local and a malformed query fails the same way
    /// every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::RateLimited)
    }

    /// Errors raised while talking to the graph store
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            AppError::GraphQuery { .. } | AppError::GraphConnection { .. } | AppError::RowDecode { .. }
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: err.field_errors().keys().next().map(|k| k.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::GraphQuery {
            query: "top_datasets".into(),
            message: "syntax error".into(),
        };
        assert_eq!(err.code(), ErrorCode::GraphQueryError);
        assert_eq!(err.code().as_code(), 7001);
        assert!(err.is_graph_error());
    }

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(AppError::RateLimited.is_retryable());
        assert!(!AppError::Upstream {
            status: 500,
            message: "boom".into()
        }
        .is_retryable());
        assert!(!AppError::GraphConnection {
            message: "refused".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_io_error_maps_to_internal() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
