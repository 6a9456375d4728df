//! Per-attempt error type for a single part fetch.

use thiserror::Error;

/// Error returned by one attempt at fetching a part. Classified by the retry
/// layer before being folded into [`DownloadError`](crate::DownloadError).
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[source] curl::Error),
    /// Response status was neither 200 nor 206.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer ended with fewer bytes than the range length
    /// (e.g. server closed early).
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Server ignored or misapplied the Range header: it sent more bytes than
    /// requested or a `Content-Range` that does not match.
    #[error("server did not honor the range request (HTTP {status}, expected {expected} bytes)")]
    RangeIgnored { status: u32, expected: u64 },
    /// Writing the part artifact failed (e.g. disk full). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// The attempt observed cancellation and stopped.
    #[error("cancelled")]
    Cancelled,
}
