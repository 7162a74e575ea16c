//! Retry with exponential back-off and jitter around document fetches.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, 429, busy renderer). Structural
//! errors — 404, missing mandatory fields, layout changes — are returned
//! immediately: retrying cannot fix an upstream layout change.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 60_000;

/// Back-off floor applied to 429 responses, so a server-requested pause is
/// honored even when the exponential schedule would retry sooner.
const RATE_LIMIT_FLOOR_MS: u64 = 5_000;

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// Back-off before the n-th retry is `backoff_base_ms * 2^(n-1)` with ±25%
/// jitter, capped at 60s. For [`ScraperError::RateLimited`] the delay floor is
/// the larger of `Retry-After` and [`RATE_LIMIT_FLOOR_MS`]. Each jittered
/// delay is additionally floored at the previous one, so successive delays
/// are monotonically non-decreasing even once the schedule saturates at the
/// cap.
///
/// # Errors
///
/// Fatal errors are returned unchanged after a single attempt. A transient
/// error that survives the whole budget is wrapped in
/// [`ScraperError::FetchExhausted`] carrying the attempt count and last cause.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    let mut last_delay_ms = 0u64;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() {
                    return Err(err);
                }
                if attempt >= max_retries {
                    return Err(ScraperError::FetchExhausted {
                        attempts: attempt + 1,
                        source: Box::new(err),
                    });
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt, last_delay_ms, &err);
                last_delay_ms = delay_ms;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Jittered exponential delay for retry number `attempt` (1-based).
/// `previous_delay_ms` is a hard floor: once the exponential schedule
/// saturates at the cap, jitter alone could otherwise make a later delay
/// shorter than an earlier one.
fn backoff_delay_ms(
    backoff_base_ms: u64,
    attempt: u32,
    previous_delay_ms: u64,
    err: &ScraperError,
) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let floor = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs
            .saturating_mul(1_000)
            .max(RATE_LIMIT_FLOOR_MS)
            .min(MAX_DELAY_MS),
        _ => 0,
    };
    jittered.max(floor).max(previous_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn busy() -> ScraperError {
        ScraperError::RendererBusy {
            url: "https://www.ogol.com.br/jogo/x".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(busy())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_exactly_the_configured_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(busy())
            }
        })
        .await;
        // max_retries=2 → exactly 3 attempts.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(ScraperError::FetchExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, ScraperError::RendererBusy { .. }));
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fatal_error_gets_a_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::NotFound {
                    url: "https://www.ogol.com.br/jogo/missing".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "404 must not be retried");
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[test]
    fn delays_are_monotonically_non_decreasing() {
        // Base 30s saturates the 60s cap from the second step on; from there
        // only the previous-delay floor keeps the sequence from dipping.
        let mut previous = 0u64;
        for attempt in 1..=12 {
            let min_possible = {
                let computed = 30_000u64.saturating_mul(1u64 << (attempt - 1).min(10));
                (computed.min(MAX_DELAY_MS) as f64 * 0.75) as u64
            };
            let observed = backoff_delay_ms(30_000, attempt, previous, &busy());
            assert!(observed >= previous, "attempt {attempt}: {observed} < {previous}");
            assert!(observed >= min_possible);
            previous = observed;
        }
    }

    #[test]
    fn rate_limit_floor_honors_retry_after() {
        let err = ScraperError::RateLimited {
            url: "u".to_owned(),
            retry_after_secs: 30,
        };
        let delay = backoff_delay_ms(1, 1, 0, &err);
        assert!(delay >= 30_000, "Retry-After must floor the delay: {delay}");
    }
}
