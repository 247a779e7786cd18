//! Metrics and observability utilities
//!
//! Records pipeline and query metrics through the `metrics` facade.
//! Nothing is exported unless the host process installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all ScholarGraph metrics
pub const METRICS_PREFIX: &str = "scholargraph";

/// Register all metric descriptions
pub fn register_metrics() {
    // Fetch metrics
    describe_counter!(
        format!("{}_pages_total", METRICS_PREFIX),
        Unit::Count,
        "Search API pages by outcome"
    );

    describe_counter!(
        format!("{}_rate_limited_total", METRICS_PREFIX),
        Unit::Count,
        "Rate-limit responses from the search API"
    );

    describe_counter!(
        format!("{}_records_fetched_total", METRICS_PREFIX),
        Unit::Count,
        "Records received from the search API"
    );

    // Cleaning metrics
    describe_gauge!(
        format!("{}_records_kept", METRICS_PREFIX),
        Unit::Count,
        "Records kept after filtering and downsampling"
    );

    // Graph metrics
    describe_histogram!(
        format!("{}_graph_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Graph query latency in seconds"
    );

    describe_gauge!(
        format!("{}_graph_query_rows", METRICS_PREFIX),
        Unit::Count,
        "Rows returned by the last graph query"
    );

    tracing::info!("Metrics registered");
}

/// Outcome label for a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Fetched,
    RateLimitExhausted,
    Rejected,
    TransportError,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Fetched => "fetched",
            PageStatus::RateLimitExhausted => "rate_limit_exhausted",
            PageStatus::Rejected => "rejected",
            PageStatus::TransportError => "transport_error",
        }
    }
}

/// Helper to record a finished page
pub fn record_page(status: PageStatus, records: usize) {
    counter!(
        format!("{}_pages_total", METRICS_PREFIX),
        "status" => status.as_str()
    )
    .increment(1);

    if records > 0 {
        counter!(format!("{}_records_fetched_total", METRICS_PREFIX)).increment(records as u64);
    }
}

/// Helper to record a rate-limit response
pub fn record_rate_limited() {
    counter!(format!("{}_rate_limited_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record the size of the cleaned working set
pub fn record_cleaning(kept: usize) {
    gauge!(format!("{}_records_kept", METRICS_PREFIX)).set(kept as f64);
}

/// Helper to record graph query metrics
pub fn record_graph_query(query: &'static str, duration_secs: f64, rows: usize) {
    histogram!(
        format!("{}_graph_query_duration_seconds", METRICS_PREFIX),
        "query" => query
    )
    .record(duration_secs);

    gauge!(
        format!("{}_graph_query_rows", METRICS_PREFIX),
        "query" => query
    )
    .set(rows as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: calls are no-ops and must not panic
        record_page(PageStatus::Fetched, 100);
        record_rate_limited();
        record_cleaning(10);
        record_graph_query("top_datasets", 0.01, 10);
    }
}
