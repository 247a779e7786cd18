//! Paginated fetcher
//!
//! Walks a search result set page by page, strictly in order, one request
//! at a time. The search API rejects any request whose `offset + limit`
//! reaches the pagination ceiling, so the page count is clamped up front.
//! Rate-limited pages are retried with exponential backoff; any other
//! failure skips the page and the fetch carries on.

use crate::errors::IngestionError;
use crate::source::{PageOutcome, PageRequest, PaperSource};
use scholargraph_common::metrics::{self, PageStatus};
use scholargraph_common::errors::AppError;
use scholargraph_common::{retry_with_backoff, Attempt, Record, RetryError, RetryPolicy, PAGINATION_CEILING};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Fetch pacing and retry settings
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Backoff applied to rate-limited pages
    pub retry: RetryPolicy,
    /// Pause after every page, whatever its outcome
    pub page_pause: Duration,
    /// Exclusive bound on `offset + limit`
    pub ceiling: u32,
    /// Field selector sent with every request
    pub fields: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            page_pause: Duration::from_secs(3),
            ceiling: PAGINATION_CEILING,
            fields: "paperId,title,abstract,year,authors,citationCount,referenceCount,venue,fieldsOfStudy"
                .to_string(),
        }
    }
}

/// Page count after applying the pagination ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Pages the caller asked for
    pub requested_pages: u32,
    /// Pages that will actually be requested
    pub pages: u32,
    pub page_size: u32,
}

impl PagePlan {
    /// Clamp `requested_pages` so that `pages * page_size < ceiling`.
    ///
    /// `page_size` must be non-zero.
    pub fn new(requested_pages: u32, page_size: u32, ceiling: u32) -> Self {
        let total = u64::from(requested_pages) * u64::from(page_size);
        let pages = if total >= u64::from(ceiling) {
            ceiling.saturating_sub(1) / page_size
        } else {
            requested_pages
        };

        Self {
            requested_pages,
            pages,
            page_size,
        }
    }

    /// True when the ceiling reduced the page count
    pub fn clamped(&self) -> bool {
        self.pages != self.requested_pages
    }

    /// `(index, offset)` for each planned page, in order
    pub fn offsets(&self) -> impl Iterator<Item = (u32, u32)> {
        let page_size = self.page_size;
        (0..self.pages).map(move |index| (index, index * page_size))
    }
}

/// Why a page was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailureReason {
    /// Still rate limited after every attempt
    RateLimitExhausted { attempts: u32 },
    /// Non-success, non-429 status
    Rejected { status: u16 },
    /// No usable response
    Transport(String),
}

/// A page that contributed no records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub index: u32,
    pub offset: u32,
    pub reason: PageFailureReason,
}

/// Everything a fetch produced
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub plan: PagePlan,
    /// Concatenation of all successful pages, in page order
    pub records: Vec<Record>,
    pub pages_fetched: u32,
    pub failures: Vec<PageFailure>,
}

/// Sequential page fetcher over a paper source
pub struct PaginatedFetcher {
    source: Arc<dyn PaperSource>,
    policy: FetchPolicy,
}

impl PaginatedFetcher {
    pub fn new(source: Arc<dyn PaperSource>, policy: FetchPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch up to `total_desired_pages` pages of `page_size` records.
    ///
    /// Failed pages are skipped and listed in the report; only an invalid
    /// page size is an error.
    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        query: &str,
        total_desired_pages: u32,
        page_size: u32,
    ) -> Result<FetchReport, IngestionError> {
        if page_size == 0 {
            return Err(IngestionError::InvalidRequest(
                "page size must be greater than zero".to_string(),
            ));
        }

        let plan = PagePlan::new(total_desired_pages, page_size, self.policy.ceiling);
        if plan.clamped() {
            info!(
                requested_pages = plan.requested_pages,
                pages = plan.pages,
                page_size,
                ceiling = self.policy.ceiling,
                "Adjusted page count to comply with API limits (offset + limit < ceiling)"
            );
        }

        let mut report = FetchReport {
            plan,
            records: Vec::new(),
            pages_fetched: 0,
            failures: Vec::new(),
        };

        for (index, offset) in plan.offsets() {
            let request = PageRequest {
                query: query.to_string(),
                offset,
                limit: page_size,
                fields: self.policy.fields.clone(),
            };

            match self.fetch_with_retry(&request).await {
                Ok(records) => {
                    info!(page = index, offset, count = records.len(), "Fetched page");
                    metrics::record_page(PageStatus::Fetched, records.len());
                    report.records.extend(records);
                    report.pages_fetched += 1;
                }
                Err(reason) => {
                    let status = match reason {
                        PageFailureReason::RateLimitExhausted { .. } => PageStatus::RateLimitExhausted,
                        PageFailureReason::Rejected { .. } => PageStatus::Rejected,
                        PageFailureReason::Transport(_) => PageStatus::TransportError,
                    };
                    metrics::record_page(status, 0);
                    report.failures.push(PageFailure { index, offset, reason });
                }
            }

            tokio::time::sleep(self.policy.page_pause).await;
        }

        info!(
            pages_fetched = report.pages_fetched,
            pages_failed = report.failures.len(),
            records = report.records.len(),
            "Fetch complete"
        );

        Ok(report)
    }

    async fn fetch_with_retry(&self, request: &PageRequest) -> Result<Vec<Record>, PageFailureReason> {
        let source = &self.source;

        let result = retry_with_backoff(&self.policy.retry, |_attempt| async move {
            match source.fetch_page(request).await.and_then(PageOutcome::into_records) {
                Ok(records) => Ok(records),
                Err(e) if e.is_retryable() => {
                    metrics::record_rate_limited();
                    Err(Attempt::Transient(e))
                }
                Err(e) => Err(Attempt::Fatal(e)),
            }
        })
        .await;

        result.map_err(|err| match err {
            RetryError::Exhausted { attempts, .. } => {
                warn!(offset = request.offset, attempts, "Rate limit persisted, skipping page");
                PageFailureReason::RateLimitExhausted { attempts }
            }
            RetryError::Aborted { error, .. } => {
                error!(offset = request.offset, error = %error, "API error, skipping page");
                match error {
                    AppError::Upstream { status, .. } => PageFailureReason::Rejected { status },
                    other => PageFailureReason::Transport(other.to_string()),
                }
            }
        })
    }
}
