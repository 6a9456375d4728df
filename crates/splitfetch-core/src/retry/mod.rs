//! Retry and backoff policy for part fetches.
//!
//! Classifies per-attempt failures (transport, HTTP status, short body,
//! storage, cancellation) and decides whether and when to try again. Delays
//! grow linearly: the wait before attempt `k + 1` is `k * delay_step`.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::SegmentError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryFailure};
