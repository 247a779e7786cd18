//! Ingestion service error types

use scholargraph_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Invalid fetch request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Malformed record data: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Search API error: {0}")]
    UpstreamError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for IngestionError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Configuration { message } => IngestionError::ConfigError(message),
            AppError::Validation { message, .. } => IngestionError::InvalidRequest(message),
            e @ AppError::Storage { .. } => IngestionError::StorageError(e.to_string()),
            AppError::InvalidFormat { message } => IngestionError::DataError(message),
            e @ AppError::Serialization(_) => IngestionError::DataError(e.to_string()),
            e @ (AppError::RateLimited | AppError::Upstream { .. } | AppError::HttpClient(_)) => {
                IngestionError::UpstreamError(e.to_string())
            }
            other => IngestionError::Internal(other.to_string()),
        }
    }
}
