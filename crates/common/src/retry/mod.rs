//! Retry with exponential backoff
//!
//! Separates the retry policy (attempt ceiling, first delay, growth factor)
//! from the action being retried. The action classifies each failure as
//! transient (wait, grow the delay, try again) or fatal (stop now).

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff policy
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Wait after the first transient failure
    pub initial_delay: Duration,

    /// Factor applied to the wait after each transient failure
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay that follows `delay`, saturating at `Duration::MAX`
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier).unwrap_or(Duration::MAX)
    }

    /// Successive waits, one per attempt
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_delay), move |d| Some(self.next_delay(*d)))
            .take(self.max_attempts as usize)
    }

    /// Longest total wait a single operation can spend backing off
    pub fn worst_case_wait(&self) -> Duration {
        self.schedule().fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Failure classification reported by a retried operation
#[derive(Debug)]
pub enum Attempt<E> {
    /// Worth retrying after a wait
    Transient(E),
    /// Retrying cannot help
    Fatal(E),
}

/// Terminal failure of a retried operation
#[derive(Debug, PartialEq)]
pub enum RetryError<E> {
    /// Every attempt failed transiently
    Exhausted { attempts: u32, last: Option<E> },
    /// An attempt failed fatally
    Aborted { attempt: u32, error: E },
}

/// Run `operation` until it succeeds, fails fatally, or the policy runs out.
///
/// `operation` receives the 1-based attempt number. Every transient failure
/// is followed by a wait, the last one included, so whatever runs next starts
/// after a cooldown.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
{
    let mut delay = policy.initial_delay;
    let mut last = None;

    for attempt in 1..=policy.max_attempts {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(Attempt::Fatal(error)) => {
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(Attempt::Transient(error)) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    wait_secs = delay.as_secs_f64(),
                    error = %error,
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                if attempt < policy.max_attempts {
                    delay = policy.next_delay(delay);
                }
                last = Some(error);
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
        last,
    })
}
