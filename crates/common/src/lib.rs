//! ScholarGraph Common Library
//!
//! Shared code for the ScholarGraph services including:
//! - Bibliographic record model
//! - Configuration management
//! - Error types and handling
//! - Retry policy with exponential backoff
//! - Persisted record files
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod retry;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use models::{AuthorRef, Record};
pub use retry::{retry_with_backoff, Attempt, RetryError, RetryPolicy};
pub use storage::RecordStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum `offset + limit` accepted by the search API (exclusive)
pub const PAGINATION_CEILING: u32 = 1000;

/// Install the tracing subscriber used by every binary.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(observability: &config::ObservabilityConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}
