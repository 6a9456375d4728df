//! Retry loop: run a closure until success, a terminal error, or cancellation.

use super::classify;
use super::error::SegmentError;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::CancelToken;

/// Last error of a retried operation and how many attempts were made.
#[derive(Debug)]
pub struct RetryFailure {
    pub attempts: u32,
    pub error: SegmentError,
}

/// Runs `f` until it succeeds or the retry policy says to stop.
///
/// `f` receives the 1-based attempt number. Between attempts the loop sleeps
/// on `cancel`; a cancellation before or between attempts ends the loop with
/// `SegmentError::Cancelled` without issuing another attempt.
pub fn run_with_retry<F>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut f: F,
) -> Result<(), RetryFailure>
where
    F: FnMut(u32) -> Result<(), SegmentError>,
{
    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(RetryFailure {
                attempts: attempt - 1,
                error: SegmentError::Cancelled,
            });
        }
        match f(attempt) {
            Ok(()) => return Ok(()),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        return Err(RetryFailure {
                            attempts: attempt,
                            error: e,
                        })
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            max_attempts = policy.max_attempts,
                            delay_ms = d.as_millis() as u64,
                            "attempt failed: {}; retrying",
                            e
                        );
                        if !cancel.sleep(d) {
                            return Err(RetryFailure {
                                attempts: attempt,
                                error: SegmentError::Cancelled,
                            });
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}
