//! Paper search sources
//!
//! A source answers one page request. It reports rate limiting and
//! rejections as outcomes rather than errors so the fetcher can decide
//! whether to retry or skip.

use async_trait::async_trait;
use scholargraph_common::errors::{AppError, Result};
use scholargraph_common::Record;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One page of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub offset: u32,
    pub limit: u32,
    pub fields: String,
}

/// Result of a single page request
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// 200: records in source order
    Page(Vec<Record>),
    /// 429
    RateLimited,
    /// Any other non-success status
    Rejected { status: u16, body: String },
}

impl PageOutcome {
    /// Records of a successful page; rate limits and rejections become errors
    pub fn into_records(self) -> Result<Vec<Record>> {
        match self {
            PageOutcome::Page(records) => Ok(records),
            PageOutcome::RateLimited => Err(AppError::RateLimited),
            PageOutcome::Rejected { status, body } => Err(AppError::Upstream {
                status,
                message: body,
            }),
        }
    }
}

/// Trait for paginated paper search backends
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Request a single page. `Err` means the request never produced a
    /// usable response (transport or decode failure).
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageOutcome>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Record>,
}

/// Semantic Scholar paper search client
pub struct SemanticScholarSource {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, url, api_key })
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageOutcome> {
        let offset = request.offset.to_string();
        let limit = request.limit.to_string();
        let mut builder = self.client.get(&self.url).query(&[
            ("query", request.query.as_str()),
            ("fields", request.fields.as_str()),
            ("offset", offset.as_str()),
            ("limit", limit.as_str()),
        ]);

        if let Some(ref key) = self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        debug!(status, offset = request.offset, "Search page response");

        let body = response.text().await?;
        parse_page(status, &body)
    }
}

/// Map a status code and body to a page outcome
pub fn parse_page(status: u16, body: &str) -> Result<PageOutcome> {
    match status {
        200 => {
            let page: SearchResponse = serde_json::from_str(body)?;
            Ok(PageOutcome::Page(page.data))
        }
        429 => Ok(PageOutcome::RateLimited),
        _ => Ok(PageOutcome::Rejected {
            status,
            body: body.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_page() {
        let body = r#"{"total": 2, "offset": 0, "next": 2, "data": [
            {"paperId": "a", "title": "First", "citationCount": 12},
            {"paperId": "b", "title": "Second"}
        ]}"#;

        match parse_page(200, body).unwrap() {
            PageOutcome::Page(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].paper_id, "a");
                assert_eq!(records[1].paper_id, "b");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_without_data_is_empty() {
        assert_eq!(
            parse_page(200, r#"{"total": 0}"#).unwrap(),
            PageOutcome::Page(Vec::new())
        );
    }

    #[test]
    fn test_parse_rate_limit_and_rejection() {
        assert_eq!(parse_page(429, "slow down").unwrap(), PageOutcome::RateLimited);
        assert_eq!(
            parse_page(400, "offset + limit must be < 1000").unwrap(),
            PageOutcome::Rejected {
                status: 400,
                body: "offset + limit must be < 1000".into()
            }
        );
    }

    #[test]
    fn test_null_fields_do_not_drop_the_page() {
        let body = r#"{"data": [
            {"paperId": "a", "title": "Kept", "authors": null, "venue": null, "citationCount": null},
            {"paperId": null, "title": "No id"},
            {"paperId": "c", "authors": [{"authorId": "1", "name": "Ada"}]}
        ]}"#;

        match parse_page(200, body).unwrap() {
            PageOutcome::Page(records) => {
                assert_eq!(records.len(), 3);
                assert!(records[0].authors.is_empty());
                assert_eq!(records[1].paper_id, "");
                assert_eq!(records[2].author_names().collect::<Vec<_>>(), vec!["Ada"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_outcome_classification() {
        let rate_limited = PageOutcome::RateLimited.into_records().unwrap_err();
        assert!(rate_limited.is_retryable());

        let rejected = PageOutcome::Rejected {
            status: 400,
            body: "bad".into(),
        }
        .into_records()
        .unwrap_err();
        assert!(!rejected.is_retryable());
        assert!(matches!(rejected, AppError::Upstream { status: 400, .. }));

        assert_eq!(PageOutcome::Page(Vec::new()).into_records().unwrap(), Vec::new());
    }

    #[test]
    fn test_parse_malformed_success_is_error() {
        assert!(parse_page(200, "<html>").is_err());
    }
}
